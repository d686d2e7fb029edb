use std::fmt;

use serde_json::Value;

use gridlink_serde::ByteWrite;

use crate::{
    connection::throttle::ThrottleCategory,
    messages::{
        identity::AgentIdentity,
        message::{Message, MessageDecl},
        message_kind::MessageKind,
        meta::MessageMeta,
    },
    packet::MessageNumber,
};

/// An owned, type-erased message
pub struct MessageContainer {
    inner: Box<dyn Message>,
}

impl MessageContainer {
    pub fn new<M: MessageDecl>(message: M) -> Self {
        Self {
            inner: Box::new(message),
        }
    }

    pub fn from_boxed(inner: Box<dyn Message>) -> Self {
        Self { inner }
    }

    pub fn kind(&self) -> MessageKind {
        self.inner.kind()
    }

    pub fn name(&self) -> &'static str {
        self.inner.name()
    }

    pub fn number(&self) -> Option<MessageNumber> {
        self.inner.number()
    }

    pub fn meta(&self) -> MessageMeta {
        self.inner.meta()
    }

    pub fn is<M: MessageDecl>(&self) -> bool {
        self.inner.as_any().is::<M>()
    }

    pub fn identity(&self) -> Option<AgentIdentity> {
        self.inner.identity()
    }

    pub fn throttle_category(&self) -> Option<ThrottleCategory> {
        self.inner.throttle_category()
    }

    pub fn write(&self, writer: &mut dyn ByteWrite) {
        self.inner.write(writer);
    }

    pub fn byte_length(&self) -> usize {
        self.inner.byte_length()
    }

    pub fn to_structured(&self) -> Option<Value> {
        self.inner.to_structured()
    }

    pub fn downcast_ref<M: MessageDecl>(&self) -> Option<&M> {
        self.inner.as_any().downcast_ref::<M>()
    }

    pub fn into_message<M: MessageDecl>(self) -> Option<M> {
        self.inner
            .into_any()
            .downcast::<M>()
            .ok()
            .map(|message| *message)
    }
}

impl Clone for MessageContainer {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone_box(),
        }
    }
}

impl fmt::Debug for MessageContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}
