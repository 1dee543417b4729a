use crate::nats::{ConsumeRequest, ConsumeResponse, MessageBroker, Subscription};
use anyhow::{Context, Result, anyhow};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tower::{Service, ServiceExt};
use tracing::{debug, error, info, warn};

/// A core NATS queue subscriber that answers requests through a Tower service stack.
///
/// Every message is handled on its own task so independent requests do not
/// wait on each other. When the service produces a reply and the message
/// carries a reply subject, the reply is published there. In-flight tasks are
/// drained before `run` returns.
pub struct RequestConsumer<S> {
    broker: Arc<dyn MessageBroker>,
    subscription: Box<dyn Subscription>,
    subject: String,
    service: S,
}

impl<S> RequestConsumer<S>
where
    S: Service<ConsumeRequest, Response = ConsumeResponse, Error = anyhow::Error>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
{
    /// Subscribe to `subject` and build the consumer
    pub async fn new(
        broker: Arc<dyn MessageBroker>,
        subject: &str,
        queue_group: Option<String>,
        service: S,
    ) -> Result<Self> {
        debug!(subject = %subject, queue_group = ?queue_group, "creating nats request consumer");

        let subscription = broker
            .subscribe(subject.to_string(), queue_group)
            .await
            .context("failed to subscribe")?;

        Ok(Self {
            broker,
            subscription,
            subject: subject.to_string(),
            service,
        })
    }

    /// Run the consumer loop until cancellation or until the subscription closes
    pub async fn run(mut self, ctx: CancellationToken) -> Result<()> {
        debug!(subject = %self.subject, "starting nats request consumer");

        let mut tasks = JoinSet::new();
        let outcome = loop {
            tokio::select! {
                biased;

                _ = ctx.cancelled() => {
                    info!(subject = %self.subject, "received shutdown signal, stopping consumer");
                    break Ok(());
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        error!(subject = %self.subject, error = %e, "request task panicked");
                    }
                }
                message = self.subscription.next_message() => {
                    match message {
                        Some(request) => {
                            let service = self.service.clone();
                            let broker = Arc::clone(&self.broker);
                            tasks.spawn(handle_request(service, broker, request));
                        }
                        None => {
                            warn!(subject = %self.subject, "subscription closed");
                            break Err(anyhow!("subscription to {} closed", self.subject));
                        }
                    }
                }
            }
        };

        debug!(in_flight = tasks.len(), "draining in-flight requests");
        while tasks.join_next().await.is_some() {}

        debug!(subject = %self.subject, "consumer stopped");
        outcome
    }
}

async fn handle_request<S>(service: S, broker: Arc<dyn MessageBroker>, request: ConsumeRequest)
where
    S: Service<ConsumeRequest, Response = ConsumeResponse, Error = anyhow::Error>,
{
    let subject = request.subject.clone();
    let reply_to = request.reply.clone();

    let response = match service.oneshot(request).await {
        Ok(response) => response,
        Err(e) => {
            error!(subject = %subject, error = %e, "service error processing request");
            return;
        }
    };

    match (response, reply_to) {
        (ConsumeResponse::Reply(body), Some(reply_to)) => {
            if let Err(e) = broker.publish(reply_to, body).await {
                error!(subject = %subject, error = %e, "failed to publish reply");
            }
        }
        (ConsumeResponse::Reply(_), None) => {
            debug!(subject = %subject, "request carried no reply subject");
        }
        (ConsumeResponse::Dropped(reason), _) => {
            warn!(subject = %subject, reason = ?reason, "dropping request");
        }
    }
}
