use thiserror::Error;

use gridlink_shared::{serde_json::Value, Uuid};

/// How an outbound message should reach the viewer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Delivery {
    /// Event-only messages go to the event queue; alternate-transport
    /// messages too when the server prefers it; everything else over UDP
    #[default]
    Auto,
    Udp,
    EventQueue,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventQueueError {
    #[error("No event queue is open for agent {agent_id}")]
    NoQueue { agent_id: Uuid },

    #[error("Event queue for agent {agent_id} is full")]
    Full { agent_id: Uuid },
}

/// Long-poll delivery sink. Events arrive as
/// `{"message": name, "body": {...}}`.
pub trait EventQueueSink: Send + Sync {
    fn enqueue(&self, agent_id: &Uuid, event: Value) -> Result<(), EventQueueError>;
}
