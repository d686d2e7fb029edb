mod circuit;
mod circuit_table;
mod handshake;

pub use circuit::{Circuit, CircuitState, CloseReason};
pub use circuit_table::{CircuitRef, CircuitTable};
pub use handshake::{validate_handshake, HandshakeAction, HandshakeError};
