//! # Gridlink Shared
//! Wire-level pieces of the viewer circuit protocol: zero-coding, the
//! datagram envelope, the message registry and the per-circuit ack,
//! throttle and ping bookkeeping.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use gridlink_serde::{
    ByteCounter, ByteReader, ByteWrite, ByteWriter, ConstByteLength, Quaternion, Serde, SerdeErr,
    Uuid, Variable1, Variable2, VariableBlock, VariableLengthError, Vector3, Vector3d,
    MAX_VARIABLE1_LEN, MAX_VARIABLE2_LEN, MTU_SIZE_BYTES,
};
pub use serde_json;

mod connection;
mod messages;
mod packet;
mod protocol;
mod sequence_list;
mod types;
mod wrapping_number;

pub mod zerocode;

pub use connection::{
    ack_manager::{AckManager, ExhaustedSend, PendingAck},
    base_connection::{BaseConnection, QueuedMessage, ResendReport},
    circuit_config::{CircuitConfig, RetransmitPolicy},
    inbound_window::{InboundClass, InboundWindow, WINDOW_SIZE},
    ping_config::PingConfig,
    ping_manager::PingManager,
    throttle::{Throttle, ThrottleCategory, ThrottleConfig, ThrottleError, TokenBucket},
    timer::Timer,
};
pub use messages::{
    builtin,
    error::{MessageError, MessageKindsError},
    identity::AgentIdentity,
    message::{Message, MessageDecl},
    message_container::MessageContainer,
    message_kind::MessageKind,
    message_kinds::MessageKinds,
    meta::{MessageMeta, Trust},
    structured,
};
pub use packet::{
    EnvelopeError, MessageNumber, Packet, PacketFlags, ACK_SIZE, MAX_APPENDED_ACKS,
    MIN_HEADER_SIZE,
};
pub use protocol::{Protocol, ProtocolError, ProtocolPlugin, TransportPlugin, ViewerCatalogPlugin};
pub use sequence_list::{SequenceError, SequenceList};
pub use types::{PingId, SequenceNumber};
pub use wrapping_number::{
    is_valid_sequence, next_sequence, sequence_greater_than, sequence_less_than, wrapping_diff,
    SEQUENCE_MODULUS,
};
pub use zerocode::ZeroCodeError;
