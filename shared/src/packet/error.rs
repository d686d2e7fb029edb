use thiserror::Error;

use crate::zerocode::ZeroCodeError;

/// Errors raised while reading or writing the datagram envelope.
///
/// SECURITY: every variant on the read side describes a datagram that is
/// dropped and counted as a protocol violation, nothing is sent back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// Datagram smaller than the fixed header
    #[error("Datagram of {length} bytes is shorter than the {minimum} byte header")]
    TooShort { length: usize, minimum: usize },

    /// Extra header length points past the end of the datagram
    #[error("Extra header of {declared} bytes overruns a {length} byte datagram")]
    ExtraHeaderOverrun { declared: usize, length: usize },

    /// Appended ack count is larger than the space available for it
    #[error("Appended ack count {count} overruns a {length} byte datagram")]
    AckListOverrun { count: usize, length: usize },

    /// A sequence number outside the 24-bit sequence space
    #[error("Sequence number {sequence:#x} is outside the sequence space")]
    SequenceOutOfRange { sequence: u32 },

    /// Zero-coded body failed to expand
    #[error("Zero-coded body is malformed: {0}")]
    ZeroCode(#[from] ZeroCodeError),

    /// Datagram would not fit in one MTU
    #[error("Datagram of {length} bytes exceeds the {limit} byte MTU")]
    Oversized { length: usize, limit: usize },

    /// More acks than the one byte count can describe
    #[error("{count} appended acks exceed the per-packet limit of {limit}")]
    TooManyAcks { count: usize, limit: usize },
}
