use std::net::SocketAddr;

use thiserror::Error;

use gridlink_shared::{builtin::UseCircuitCode, Uuid};

use crate::circuit::{Circuit, CircuitState};

/// Reasons a `UseCircuitCode` is refused. No circuit is created or changed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandshakeError {
    #[error("Circuit code {code:#x} was never issued")]
    UnknownCode { code: u32 },

    /// Agent or session id does not match the ones the code was issued to
    #[error("Circuit code {code:#x} presented by agent {agent_id} does not match its issued identity")]
    IdentityMismatch { code: u32, agent_id: Uuid },

    /// Circuit is already bound to another endpoint
    #[error("Circuit code {code:#x} is already in use by {endpoint}")]
    AlreadyBound { code: u32, endpoint: SocketAddr },

    #[error("Circuit code {code:#x} belongs to a closed circuit")]
    Closed { code: u32 },

    /// First packet from an unknown endpoint was not `UseCircuitCode`
    #[error("Expected UseCircuitCode from unknown endpoint {endpoint}, got {name}")]
    UnexpectedMessage {
        endpoint: SocketAddr,
        name: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeAction {
    /// Bind the endpoint and move to `Established`
    Establish,
    /// Viewer resent its `UseCircuitCode`; ack it and carry on
    Repeat,
}

/// Checks a `UseCircuitCode` against the circuit its code was issued for
pub fn validate_handshake(
    circuit: &Circuit,
    message: &UseCircuitCode,
    endpoint: SocketAddr,
) -> Result<HandshakeAction, HandshakeError> {
    let code = message.code;
    if circuit.circuit_code() != code {
        return Err(HandshakeError::UnknownCode { code });
    }
    if circuit.agent_id() != message.agent_id || circuit.session_id() != message.session_id {
        return Err(HandshakeError::IdentityMismatch {
            code,
            agent_id: message.agent_id,
        });
    }
    match circuit.state() {
        CircuitState::Handshaking => Ok(HandshakeAction::Establish),
        CircuitState::Established | CircuitState::Draining => match circuit.remote_endpoint() {
            Some(bound) if bound == endpoint => Ok(HandshakeAction::Repeat),
            Some(bound) => Err(HandshakeError::AlreadyBound {
                code,
                endpoint: bound,
            }),
            None => Ok(HandshakeAction::Establish),
        },
        CircuitState::Closed => Err(HandshakeError::Closed { code }),
    }
}
