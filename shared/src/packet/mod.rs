mod error;
mod flags;
mod message_number;
mod packet;

pub use error::EnvelopeError;
pub use flags::PacketFlags;
pub use message_number::MessageNumber;
pub use packet::{Packet, ACK_SIZE, MAX_APPENDED_ACKS, MIN_HEADER_SIZE};
