pub mod local_socket;

pub use helpers::*;
pub use local_socket::LocalSocketPair;
pub use test_protocol::{chat, protocol, region_handshake};
