use crate::{error::SerdeErr, reader::ByteReader, writer::ByteWrite, writer::ByteCounter};

/// A value that can be written to and read from the wire.
///
/// All multi-byte scalars are little-endian. Byte order of envelope fields
/// (sequence numbers, message tokens, appended acks) is handled by the
/// envelope itself.
pub trait Serde: Sized + Clone + PartialEq {
    fn ser(&self, writer: &mut dyn ByteWrite);

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr>;

    /// Number of bytes `ser` will write
    fn byte_length(&self) -> usize {
        let mut counter = ByteCounter::new();
        self.ser(&mut counter);
        counter.count()
    }
}

pub trait ConstByteLength {
    fn const_byte_length() -> usize;
}
