use common::Envelope;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

/// Change notifications and commands fanned out to other services
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastTopic {
    ConfigurationChanged,
    ReportChanged,
    ExecuteCommand,
}

impl BroadcastTopic {
    pub fn as_str(self) -> &'static str {
        match self {
            BroadcastTopic::ConfigurationChanged => "ComponentService/component_Configuration_Changed",
            BroadcastTopic::ReportChanged => "ComponentService/Component_Report_Changed",
            BroadcastTopic::ExecuteCommand => "ComponentService/Execute_Command",
        }
    }
}

impl std::fmt::Display for BroadcastTopic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct BroadcastEvent {
    pub topic: BroadcastTopic,
    pub envelope: Envelope,
}

/// In-process publish/subscribe channel injected into the routers.
///
/// Subscribers only see events published after they subscribed.
#[derive(Debug, Clone)]
pub struct BroadcastBus {
    sender: broadcast::Sender<BroadcastEvent>,
}

impl BroadcastBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BroadcastEvent> {
        self.sender.subscribe()
    }

    /// Wrap `payload` in an envelope sourced from `module_name` and publish it.
    ///
    /// Returns whether at least one subscriber received the event.
    pub fn publish(&self, topic: BroadcastTopic, module_name: &str, payload: Value) -> bool {
        let envelope = Envelope::new(module_name, topic.as_str(), payload);
        match self.sender.send(BroadcastEvent { topic, envelope }) {
            Ok(receivers) => {
                debug!(topic = %topic, receivers, "broadcast published");
                true
            }
            Err(_) => {
                debug!(topic = %topic, "broadcast had no subscribers");
                false
            }
        }
    }
}
