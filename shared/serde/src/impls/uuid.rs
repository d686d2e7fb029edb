use uuid::Uuid;

use crate::{
    error::SerdeErr, reader::ByteReader, serde::ConstByteLength, serde::Serde, writer::ByteWrite,
};

// Identifiers travel as their 16 raw bytes, in RFC 4122 order.
impl Serde for Uuid {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        writer.write_bytes(self.as_bytes());
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let bytes = reader.read_array::<16>()?;
        Ok(Uuid::from_bytes(bytes))
    }

    fn byte_length(&self) -> usize {
        16
    }
}

impl ConstByteLength for Uuid {
    fn const_byte_length() -> usize {
        16
    }
}
