mod component;
mod envelope;
mod query_param;
mod repository;
mod result;

pub use component::*;
pub use envelope::*;
pub use query_param::*;
pub use repository::*;
pub use result::*;
