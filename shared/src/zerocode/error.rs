use thiserror::Error;

/// Errors that can occur while expanding a zero-coded body.
///
/// SECURITY: zero-coded bodies come straight off the network, every
/// malformed input maps to one of these instead of a panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZeroCodeError {
    /// A zero marker was followed by a repeat count of 0
    #[error("Zero-coded run at offset {offset} has a repeat count of 0")]
    ZeroRunLength { offset: usize },

    /// The buffer ended right after a zero marker
    #[error("Zero-coded run at offset {offset} is missing its repeat count")]
    TruncatedRun { offset: usize },

    /// Expansion would exceed the decode limit
    #[error("Zero-coded body expands past the {limit} byte limit")]
    Oversized { limit: usize },
}
