use thiserror::Error;

use gridlink_shared::{EnvelopeError, MessageError, ThrottleError, Uuid};

use crate::{
    circuit::HandshakeError,
    dispatch::{DispatchError, TrustViolation},
    event_queue::EventQueueError,
};

/// Errors returned by an outbound send
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("No circuit is open for agent {agent_id}")]
    CircuitNotFound { agent_id: Uuid },

    /// Circuit has not completed its handshake yet
    #[error("Circuit for agent {agent_id} is not established and can not carry {name}")]
    CircuitNotEstablished { agent_id: Uuid, name: &'static str },

    /// Circuit is logging out and accepts no new reliable application traffic
    #[error("Circuit for agent {agent_id} is draining, {name} refused")]
    CircuitDraining { agent_id: Uuid, name: &'static str },

    #[error("Message {name} is event-queue only but no event queue is installed")]
    NoEventQueue { name: &'static str },

    #[error("Event queue rejected the message: {0}")]
    EventQueue(#[from] EventQueueError),

    #[error("Message error: {0}")]
    Message(#[from] MessageError),
}

/// Top-level error type of the server
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridlinkServerError {
    #[error("Agent {agent_id} already has a circuit")]
    CircuitExists { agent_id: Uuid },

    #[error("Circuit code {code:#x} is already issued")]
    CircuitCodeInUse { code: u32 },

    #[error("No circuit is open for agent {agent_id}")]
    CircuitNotFound { agent_id: Uuid },

    /// Structured event is missing its `message` name or `body`
    #[error("Malformed structured event: {reason}")]
    MalformedEvent { reason: &'static str },

    #[error("Handshake error: {0}")]
    Handshake(#[from] HandshakeError),

    #[error("Trust violation: {0}")]
    TrustViolation(#[from] TrustViolation),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Send error: {0}")]
    Send(#[from] SendError),

    #[error("Message error: {0}")]
    Message(#[from] MessageError),

    #[error("Envelope error: {0}")]
    Envelope(#[from] EnvelopeError),

    #[error("Throttle error: {0}")]
    Throttle(#[from] ThrottleError),
}
