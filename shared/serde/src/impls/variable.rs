use thiserror::Error;

use crate::{
    constants::{MAX_VARIABLE1_LEN, MAX_VARIABLE2_LEN},
    error::SerdeErr,
    reader::ByteReader,
    serde::Serde,
    writer::ByteWrite,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariableLengthError {
    #[error("Variable field of {length} bytes exceeds the {limit} byte limit of its length prefix")]
    TooLong { length: usize, limit: usize },
}

macro_rules! variable_field {
    ($name:ident, $prefix:ty, $limit:expr) => {
        /// Byte field carrying its own length prefix. Text fields are stored
        /// NUL-terminated, as legacy viewers expect.
        #[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
        pub struct $name(Vec<u8>);

        impl $name {
            pub const LIMIT: usize = $limit;

            pub fn try_new(bytes: Vec<u8>) -> Result<Self, VariableLengthError> {
                if bytes.len() > Self::LIMIT {
                    return Err(VariableLengthError::TooLong {
                        length: bytes.len(),
                        limit: Self::LIMIT,
                    });
                }
                Ok(Self(bytes))
            }

            pub fn empty() -> Self {
                Self(Vec::new())
            }

            /// Stores `text` NUL-terminated, cutting it on a char boundary when
            /// it does not fit.
            pub fn from_str_truncated(text: &str) -> Self {
                let mut end = text.len().min(Self::LIMIT - 1);
                while !text.is_char_boundary(end) {
                    end -= 1;
                }
                let mut bytes = Vec::with_capacity(end + 1);
                bytes.extend_from_slice(&text.as_bytes()[..end]);
                bytes.push(0);
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            pub fn into_bytes(self) -> Vec<u8> {
                self.0
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Text content, with the trailing NUL (if any) removed
            pub fn to_string_lossy(&self) -> String {
                let bytes = match self.0.split_last() {
                    Some((0, rest)) => rest,
                    _ => &self.0[..],
                };
                String::from_utf8_lossy(bytes).into_owned()
            }
        }

        impl Serde for $name {
            fn ser(&self, writer: &mut dyn ByteWrite) {
                // try_new guarantees the length fits the prefix
                let length = self.0.len() as $prefix;
                writer.write_bytes(&length.to_le_bytes());
                writer.write_bytes(&self.0);
            }

            fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
                let prefix = reader.read_array::<{ std::mem::size_of::<$prefix>() }>()?;
                let length = <$prefix>::from_le_bytes(prefix) as usize;
                let bytes = reader.read_bytes(length)?;
                Ok(Self(bytes.to_vec()))
            }

            fn byte_length(&self) -> usize {
                std::mem::size_of::<$prefix>() + self.0.len()
            }
        }
    };
}

variable_field!(Variable1, u8, MAX_VARIABLE1_LEN);
variable_field!(Variable2, u16, MAX_VARIABLE2_LEN);
