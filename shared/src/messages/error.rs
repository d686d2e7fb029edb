use thiserror::Error;

use crate::packet::{EnvelopeError, MessageNumber};

/// Errors that can occur while building the message registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageKindsError {
    /// Two message types share a wire token
    #[error("Message number {number:?} of {name} is already registered to {existing}")]
    DuplicateNumber {
        number: MessageNumber,
        name: &'static str,
        existing: &'static str,
    },

    /// Two message types share a name
    #[error("Message name {name} is already registered")]
    DuplicateName { name: &'static str },

    /// The declared token can not be written unambiguously
    #[error("Message number {number:?} of {name} is not a valid wire token")]
    InvalidNumber {
        number: MessageNumber,
        name: &'static str,
    },

    /// A message without a wire token must be deliverable over the event queue
    #[error("Message {name} has no message number and is not marked for alternate transport")]
    EventOnlyWithoutAltTransport { name: &'static str },

    /// Message kind not found in registry
    #[error("Message kind not found in registry. Message type must be registered with Protocol via add_message()")]
    MessageKindNotFound,
}

/// Errors that can occur while reading or writing a message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    /// Token is well formed but no message type is registered for it
    #[error("No message type registered for message number {number:?}")]
    UnknownMessageType { number: MessageNumber },

    /// No message type is registered under this name
    #[error("No message type registered under the name {name:?}")]
    UnknownMessageName { name: String },

    /// Body too short to hold a message token
    #[error("Message body does not start with a valid message number")]
    InvalidMessageNumber,

    /// Fields of a known message failed to decode
    #[error("Failed to decode the fields of {name}")]
    Decode { name: &'static str },

    /// Structured form of a known message failed to decode
    #[error("Failed to decode the structured form of {name}")]
    StructuredDecode { name: &'static str },

    /// Message only travels over the event queue
    #[error("Message {name} has no message number and can not be sent over UDP")]
    NotUdpDeliverable { name: &'static str },

    /// Message has no structured form
    #[error("Message {name} is not eligible for alternate transport")]
    NotAltTransport { name: &'static str },

    /// Message kinds error
    #[error("Message kinds error: {0}")]
    MessageKinds(#[from] MessageKindsError),

    /// Envelope error
    #[error("Envelope error: {0}")]
    Envelope(#[from] EnvelopeError),
}
