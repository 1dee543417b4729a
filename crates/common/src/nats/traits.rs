use crate::nats::ConsumeRequest;
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Trait for core NATS messaging operations
/// Abstracts publish, request/reply and queue subscriptions so the routers and
/// consumers can be exercised without a running server
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MessageBroker: Send + Sync {
    /// Fire-and-forget publish
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()>;

    /// Publish and await the single reply
    async fn request(&self, subject: String, payload: Bytes) -> Result<Bytes>;

    /// Subscribe to a subject, joining the queue group when one is given
    async fn subscribe(
        &self,
        subject: String,
        queue_group: Option<String>,
    ) -> Result<Box<dyn Subscription>>;
}

/// A live subscription yielding owned messages
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait Subscription: Send {
    /// Next message, or `None` once the subscription is closed
    async fn next_message(&mut self) -> Option<ConsumeRequest>;
}
