mod broadcast;
mod commands;
mod configuration_router;
mod entry_router;
mod manager_router;
mod parameter_extractor;
mod registration_router;
mod report_router;
mod routing;
mod schema_validation;

pub use broadcast::*;
pub use commands::*;
pub use configuration_router::*;
pub use entry_router::*;
pub use manager_router::*;
pub use parameter_extractor::*;
pub use registration_router::*;
pub use report_router::*;
pub use schema_validation::*;
