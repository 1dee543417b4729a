mod domain;
mod json_schema;
mod nats;
mod postgres;
mod telemetry;

pub use domain::*;
pub use json_schema::*;
pub use nats::*;
pub use postgres::*;
pub use telemetry::*;

// Re-export mocks when testing feature is enabled
#[cfg(any(test, feature = "testing"))]
pub use domain::MockComponentRepository;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockComponentTypeRepository;
#[cfg(any(test, feature = "testing"))]
pub use json_schema::MockSchemaValidator;
#[cfg(any(test, feature = "testing"))]
pub use nats::MockMessageBroker;
#[cfg(any(test, feature = "testing"))]
pub use nats::MockSubscription;
