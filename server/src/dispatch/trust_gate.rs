use thiserror::Error;

use gridlink_shared::{AgentIdentity, MessageMeta, Trust, Uuid};

use crate::circuit::CircuitState;

/// Channel a message arrived on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Raw UDP socket
    Network,
    /// Simulator-internal call or the event queue
    Internal,
}

/// A message that must not reach its handlers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrustViolation {
    #[error("Trusted message {name} arrived on the raw socket")]
    TrustedOnNetwork { name: &'static str },

    #[error("Untrusted message {name} arrived from an internal origin")]
    UntrustedInternal { name: &'static str },

    #[error("Untrusted message {name} arrived on a circuit in state {state:?}")]
    CircuitNotConnected {
        name: &'static str,
        state: CircuitState,
    },

    #[error("Message {name} claims agent {claimed}, circuit belongs to {expected}")]
    AgentMismatch {
        name: &'static str,
        claimed: Uuid,
        expected: Uuid,
    },

    #[error("Message {name} claims session {claimed}, circuit carries {expected}")]
    SessionMismatch {
        name: &'static str,
        claimed: Uuid,
        expected: Uuid,
    },
}

/// Decides whether a decoded message may be dispatched.
///
/// `claimed` is the identity embedded in the message, `circuit` the one the
/// circuit was issued for.
pub fn check_trust(
    name: &'static str,
    meta: &MessageMeta,
    origin: Origin,
    state: CircuitState,
    circuit: &AgentIdentity,
    claimed: Option<AgentIdentity>,
) -> Result<(), TrustViolation> {
    match meta.trust {
        Trust::Unset => Ok(()),
        Trust::Trusted => match origin {
            Origin::Internal => Ok(()),
            Origin::Network => Err(TrustViolation::TrustedOnNetwork { name }),
        },
        Trust::NotTrusted => {
            if origin != Origin::Network {
                return Err(TrustViolation::UntrustedInternal { name });
            }
            if !state.is_connected() {
                return Err(TrustViolation::CircuitNotConnected { name, state });
            }
            let Some(claimed) = claimed else {
                return Ok(());
            };
            if claimed.agent_id != circuit.agent_id {
                return Err(TrustViolation::AgentMismatch {
                    name,
                    claimed: claimed.agent_id,
                    expected: circuit.agent_id,
                });
            }
            if claimed.session_id != circuit.session_id {
                return Err(TrustViolation::SessionMismatch {
                    name,
                    claimed: claimed.session_id,
                    expected: circuit.session_id,
                });
            }
            Ok(())
        }
    }
}
