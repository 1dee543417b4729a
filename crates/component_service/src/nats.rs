mod broadcast_forwarder;
mod request_service;

pub use broadcast_forwarder::*;
pub use request_service::*;
