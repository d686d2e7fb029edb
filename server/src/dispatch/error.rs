use thiserror::Error;

use gridlink_shared::Trust;

use crate::dispatch::HandlerTrust;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Handler declared for a trust class the message can never arrive with
    #[error("Handler declared {declared:?} can not handle {name}, which is {trust:?}")]
    TrustMismatch {
        name: &'static str,
        declared: HandlerTrust,
        trust: Trust,
    },

    #[error("Message kind not found in registry. Message type must be registered with Protocol before a handler")]
    MessageKindNotFound,
}
