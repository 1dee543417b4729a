use crate::nats::trace_context::trace_headers;
use crate::nats::traits::{MessageBroker, Subscription};
use crate::nats::ConsumeRequest;
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{info, instrument};

pub struct NatsClient {
    client: async_nats::Client,
}

impl NatsClient {
    pub async fn connect(url: &str, timeout: std::time::Duration) -> Result<Self> {
        info!(url = %url, timeout_ms = timeout.as_millis(), "Connecting to NATS");

        // Configure connection timeout for establishing the TCP connection
        let client = async_nats::ConnectOptions::new()
            .connection_timeout(timeout)
            .connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Successfully connected to NATS");
        Ok(Self { client })
    }

    /// Create a MessageBroker trait object from this client
    pub fn create_broker(&self) -> Arc<dyn MessageBroker> {
        Arc::new(NatsBroker::new(self.client.clone()))
    }

    /// Flush pending publishes before the connection is dropped
    pub async fn close(self) -> Result<()> {
        info!("Closing NATS connection");
        self.client
            .flush()
            .await
            .context("Failed to flush NATS connection")?;
        Ok(())
    }
}

/// Concrete implementation of MessageBroker using async-nats
pub struct NatsBroker {
    client: async_nats::Client,
}

impl NatsBroker {
    pub fn new(client: async_nats::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MessageBroker for NatsBroker {
    #[instrument(skip(self, payload), fields(subject = %subject, payload_size = payload.len()))]
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()> {
        self.client
            .publish_with_headers(subject, trace_headers(), payload)
            .await
            .context("Failed to publish message to NATS")?;
        Ok(())
    }

    #[instrument(skip(self, payload), fields(subject = %subject, payload_size = payload.len()))]
    async fn request(&self, subject: String, payload: Bytes) -> Result<Bytes> {
        let reply = self
            .client
            .request_with_headers(subject, trace_headers(), payload)
            .await
            .context("NATS request failed")?;
        Ok(reply.payload)
    }

    async fn subscribe(
        &self,
        subject: String,
        queue_group: Option<String>,
    ) -> Result<Box<dyn Subscription>> {
        let subscriber = match queue_group {
            Some(group) => self.client.queue_subscribe(subject, group).await,
            None => self.client.subscribe(subject).await,
        }
        .context("Failed to subscribe")?;

        Ok(Box::new(NatsSubscription { subscriber }))
    }
}

/// Concrete implementation of Subscription over an async-nats subscriber
pub struct NatsSubscription {
    subscriber: async_nats::Subscriber,
}

#[async_trait]
impl Subscription for NatsSubscription {
    async fn next_message(&mut self) -> Option<ConsumeRequest> {
        let message = self.subscriber.next().await?;

        Some(ConsumeRequest {
            subject: message.subject.to_string(),
            payload: message.payload,
            headers: message.headers,
            reply: message.reply.map(|reply| reply.to_string()),
        })
    }
}
