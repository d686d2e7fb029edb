use std::net::SocketAddr;

use gridlink_shared::{SequenceNumber, Uuid};

use crate::{
    circuit::{CloseReason, HandshakeError},
    dispatch::TrustViolation,
};

/// Things the server reports back to the embedding simulator
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerEvent {
    CircuitEstablished {
        agent_id: Uuid,
        endpoint: SocketAddr,
    },
    LogoutStarted {
        agent_id: Uuid,
    },
    CircuitClosed {
        agent_id: Uuid,
        reason: CloseReason,
    },
    /// A reliable packet was abandoned after its last resend
    RetransmitExhausted {
        agent_id: Uuid,
        sequence: SequenceNumber,
        name: &'static str,
        retry_count: u8,
    },
    TrustViolation {
        agent_id: Uuid,
        violation: TrustViolation,
    },
    HandshakeRejected {
        endpoint: SocketAddr,
        error: HandshakeError,
    },
}
