use thiserror::Error;

/// Returned whenever a value cannot be read from a byte stream: either the
/// stream ran out, or the bytes do not describe a valid value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Failed to deserialize value: stream exhausted or malformed")]
pub struct SerdeErr;
