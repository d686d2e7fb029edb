/// Per-circuit, per-direction packet sequence number. Only the low 24 bits
/// are used; see [`SEQUENCE_MODULUS`](crate::SEQUENCE_MODULUS).
pub type SequenceNumber = u32;

/// Ping identifiers wrap at one byte
pub type PingId = u8;
