use crate::domain::{BroadcastEvent, EntryRouter};
use std::sync::Arc;
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Publishes every bus event through the entry router's broadcast path
pub struct BroadcastForwarder {
    router: Arc<EntryRouter>,
    receiver: broadcast::Receiver<BroadcastEvent>,
}

impl BroadcastForwarder {
    pub fn new(router: Arc<EntryRouter>, receiver: broadcast::Receiver<BroadcastEvent>) -> Self {
        Self { router, receiver }
    }

    /// Forward events until cancelled or until every sender is gone.
    ///
    /// Events already queued when `ctx` fires are still published before returning.
    pub async fn run(mut self, ctx: CancellationToken) -> anyhow::Result<()> {
        let subject = self.router.broadcast_subject().to_string();
        info!(subject = %subject, "starting broadcast forwarder");

        loop {
            tokio::select! {
                biased;

                _ = ctx.cancelled() => {
                    info!("received shutdown signal, flushing pending broadcasts");
                    self.flush(&subject).await;
                    return Ok(());
                }
                event = self.receiver.recv() => match event {
                    Ok(event) => self.forward(&subject, &event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "broadcast forwarder lagged, events dropped");
                    }
                    Err(RecvError::Closed) => {
                        debug!("broadcast bus closed");
                        return Ok(());
                    }
                },
            }
        }
    }

    async fn flush(&mut self, subject: &str) {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => self.forward(subject, &event).await,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "broadcast forwarder lagged, events dropped");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }

    async fn forward(&self, subject: &str, event: &BroadcastEvent) {
        let result = self.router.broadcast_message(subject, &event.envelope).await;
        debug!(topic = %event.topic, result = ?result, "broadcast forwarded");
    }
}
