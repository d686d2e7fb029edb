use std::{any::Any, fmt::Debug};

use serde_json::Value;

use gridlink_serde::{ByteCounter, ByteReader, ByteWrite, SerdeErr};

use crate::{
    connection::throttle::ThrottleCategory,
    messages::{identity::AgentIdentity, message_kind::MessageKind, meta::MessageMeta},
    packet::MessageNumber,
};

/// Declaration of one protocol message type: its wire token, metadata and
/// field codec. Field order in `write`/`read` is the wire order.
pub trait MessageDecl: Clone + Debug + Send + Sync + 'static {
    const NAME: &'static str;
    /// `None` for messages that only travel over the event queue
    const NUMBER: Option<MessageNumber>;
    const META: MessageMeta;

    fn read(reader: &mut ByteReader) -> Result<Self, SerdeErr>;

    fn write(&self, writer: &mut dyn ByteWrite);

    /// Embedded agent/session ids, checked against the circuit for
    /// `NotTrusted` messages
    fn identity(&self) -> Option<AgentIdentity> {
        None
    }

    fn throttle_category(&self) -> Option<ThrottleCategory> {
        Self::META.throttle
    }

    /// Event queue form of the body
    fn to_structured(&self) -> Option<Value> {
        None
    }

    fn from_structured(_value: &Value) -> Option<Self> {
        None
    }
}

/// Object-safe view of a message, implemented for every `MessageDecl`
pub trait Message: Debug + Send + Sync + 'static {
    fn kind(&self) -> MessageKind;
    fn name(&self) -> &'static str;
    fn number(&self) -> Option<MessageNumber>;
    fn meta(&self) -> MessageMeta;
    fn write(&self, writer: &mut dyn ByteWrite);
    fn byte_length(&self) -> usize;
    fn identity(&self) -> Option<AgentIdentity>;
    fn throttle_category(&self) -> Option<ThrottleCategory>;
    fn to_structured(&self) -> Option<Value>;
    fn clone_box(&self) -> Box<dyn Message>;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<M: MessageDecl> Message for M {
    fn kind(&self) -> MessageKind {
        MessageKind::of::<M>()
    }

    fn name(&self) -> &'static str {
        M::NAME
    }

    fn number(&self) -> Option<MessageNumber> {
        M::NUMBER
    }

    fn meta(&self) -> MessageMeta {
        M::META
    }

    fn write(&self, writer: &mut dyn ByteWrite) {
        MessageDecl::write(self, writer);
    }

    fn byte_length(&self) -> usize {
        let mut counter = ByteCounter::new();
        MessageDecl::write(self, &mut counter);
        counter.count()
    }

    fn identity(&self) -> Option<AgentIdentity> {
        MessageDecl::identity(self)
    }

    fn throttle_category(&self) -> Option<ThrottleCategory> {
        MessageDecl::throttle_category(self)
    }

    fn to_structured(&self) -> Option<Value> {
        MessageDecl::to_structured(self)
    }

    fn clone_box(&self) -> Box<dyn Message> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}
