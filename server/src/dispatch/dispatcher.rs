use std::{
    any::Any,
    collections::HashMap,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use log::warn;
use parking_lot::RwLock;

use gridlink_shared::{MessageContainer, MessageKind, MessageKinds};

use crate::dispatch::{DispatchError, HandlerContext, HandlerError, HandlerTrust, MessageHandler};

/// Result of dispatching one message
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    pub invoked: usize,
    pub failures: Vec<HandlerError>,
}

/// Ordered handler lists per message kind
#[derive(Default)]
pub struct Dispatcher {
    handlers: RwLock<HashMap<MessageKind, Vec<Arc<dyn MessageHandler>>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler for `kind`. Handlers run in registration order.
    pub fn register(
        &self,
        message_kinds: &MessageKinds,
        kind: MessageKind,
        trust: HandlerTrust,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<(), DispatchError> {
        let meta = message_kinds
            .meta(&kind)
            .ok_or(DispatchError::MessageKindNotFound)?;
        if !trust.accepts(&meta) {
            return Err(DispatchError::TrustMismatch {
                name: message_kinds.name(&kind).unwrap_or("unknown"),
                declared: trust,
                trust: meta.trust,
            });
        }
        self.handlers.write().entry(kind).or_default().push(handler);
        Ok(())
    }

    pub fn handler_count(&self, kind: &MessageKind) -> usize {
        self.handlers.read().get(kind).map_or(0, Vec::len)
    }

    /// Invokes every handler of the message's kind. A failing or panicking
    /// handler is logged and skipped; the rest still run.
    pub fn dispatch(&self, context: &HandlerContext, message: &MessageContainer) -> DispatchOutcome {
        // registration may happen from inside a handler
        let handlers = match self.handlers.read().get(&message.kind()) {
            Some(handlers) => handlers.clone(),
            None => return DispatchOutcome::default(),
        };

        let mut outcome = DispatchOutcome::default();
        for handler in handlers {
            outcome.invoked += 1;
            let result = panic::catch_unwind(AssertUnwindSafe(|| handler.handle(context, message)))
                .unwrap_or_else(|payload| Err(HandlerError::Panicked(panic_text(payload))));
            if let Err(error) = result {
                warn!(
                    "handler for {} from agent {} failed: {}",
                    message.name(),
                    context.agent_id,
                    error
                );
                outcome.failures.push(error);
            }
        }
        outcome
    }
}

fn panic_text(payload: Box<dyn Any + Send>) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text.to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
