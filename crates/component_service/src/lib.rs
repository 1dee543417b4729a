pub mod component_service;
pub mod domain;
pub mod nats;

pub use component_service::*;
pub use domain::*;
pub use nats::*;
