use std::net::SocketAddr;

use thiserror::Error;

use gridlink_shared::{MessageContainer, MessageMeta, Trust, Uuid};

use crate::dispatch::Origin;

/// Trust class a handler is written for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandlerTrust {
    /// Handles simulator-internal messages only
    Trusted,
    /// Handles messages from viewers
    Untrusted,
    Any,
}

impl HandlerTrust {
    /// Whether a handler of this class can ever see a message with `meta`
    pub fn accepts(&self, meta: &MessageMeta) -> bool {
        match (self, meta.trust) {
            (HandlerTrust::Any, _) | (_, Trust::Unset) => true,
            (HandlerTrust::Trusted, Trust::Trusted) => true,
            (HandlerTrust::Untrusted, Trust::NotTrusted) => true,
            _ => false,
        }
    }
}

/// What a handler learns about where a message came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandlerContext {
    pub agent_id: Uuid,
    pub session_id: Uuid,
    pub origin: Origin,
    /// Bound viewer endpoint, if the circuit has one
    pub endpoint: Option<SocketAddr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("{0}")]
    Failed(String),

    #[error("Handler panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    pub fn failed(reason: impl Into<String>) -> Self {
        HandlerError::Failed(reason.into())
    }
}

/// Extension point invoked for every dispatched message of the kinds it
/// was registered for
pub trait MessageHandler: Send + Sync {
    fn handle(
        &self,
        context: &HandlerContext,
        message: &MessageContainer,
    ) -> Result<(), HandlerError>;
}

impl<F> MessageHandler for F
where
    F: Fn(&HandlerContext, &MessageContainer) -> Result<(), HandlerError> + Send + Sync,
{
    fn handle(
        &self,
        context: &HandlerContext,
        message: &MessageContainer,
    ) -> Result<(), HandlerError> {
        self(context, message)
    }
}
