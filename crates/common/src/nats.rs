mod client;
mod middleware;
mod request_consumer;
mod trace_context;
mod traits;

pub use client::*;
pub use middleware::*;
pub use request_consumer::*;
pub use trace_context::*;
pub use traits::*;
