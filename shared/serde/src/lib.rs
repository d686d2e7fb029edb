//! # Gridlink Serde
//! Byte-aligned reader/writer and the `Serde` trait used by every message
//! field of the viewer protocol.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod constants;
mod error;
mod impls;
mod reader;
mod serde;
mod writer;

pub use constants::{MAX_VARIABLE1_LEN, MAX_VARIABLE2_LEN, MTU_SIZE_BYTES};
pub use error::SerdeErr;
pub use impls::{
    block::VariableBlock,
    variable::{Variable1, Variable2, VariableLengthError},
    vector::{Quaternion, Vector3, Vector3d},
};
pub use reader::ByteReader;
pub use serde::{ConstByteLength, Serde};
pub use writer::{ByteCounter, ByteWrite, ByteWriter};
pub use uuid::Uuid;
