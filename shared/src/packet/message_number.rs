use gridlink_serde::{ByteReader, ByteWrite, SerdeErr};

/// Message type token at the start of every body.
///
/// | frequency | wire form                 | width   |
/// |-----------|---------------------------|---------|
/// | High      | `nn` (0x01..=0xFE)        | 1 byte  |
/// | Medium    | `FF nn`                   | 2 bytes |
/// | Low       | `FF FF nn nn` (big-endian)| 4 bytes |
/// | Fixed     | `FF FF FF nn` (nn >= FA)  | 4 bytes |
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageNumber {
    High(u8),
    Medium(u8),
    Low(u16),
    Fixed(u8),
}

const FIXED_FLOOR: u8 = 0xFA;

impl MessageNumber {
    /// Whether this token can be written unambiguously
    pub fn is_valid(&self) -> bool {
        match self {
            MessageNumber::High(number) => *number != 0 && *number != 0xFF,
            MessageNumber::Medium(number) => *number != 0xFF,
            MessageNumber::Low(number) => *number != 0xFFFF && *number >> 8 != 0xFF,
            MessageNumber::Fixed(number) => *number >= FIXED_FLOOR,
        }
    }

    pub fn byte_length(&self) -> usize {
        match self {
            MessageNumber::High(_) => 1,
            MessageNumber::Medium(_) => 2,
            MessageNumber::Low(_) | MessageNumber::Fixed(_) => 4,
        }
    }

    pub fn ser(&self, writer: &mut dyn ByteWrite) {
        match self {
            MessageNumber::High(number) => writer.write_byte(*number),
            MessageNumber::Medium(number) => writer.write_bytes(&[0xFF, *number]),
            MessageNumber::Low(number) => {
                writer.write_bytes(&[0xFF, 0xFF]);
                writer.write_bytes(&number.to_be_bytes());
            }
            MessageNumber::Fixed(number) => writer.write_bytes(&[0xFF, 0xFF, 0xFF, *number]),
        }
    }

    pub fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let first = reader.read_byte()?;
        if first == 0 {
            return Err(SerdeErr);
        }
        if first != 0xFF {
            return Ok(MessageNumber::High(first));
        }
        let second = reader.read_byte()?;
        if second != 0xFF {
            return Ok(MessageNumber::Medium(second));
        }
        let [third, fourth] = reader.read_array::<2>()?;
        if third == 0xFF {
            if fourth < FIXED_FLOOR {
                return Err(SerdeErr);
            }
            return Ok(MessageNumber::Fixed(fourth));
        }
        Ok(MessageNumber::Low(u16::from_be_bytes([third, fourth])))
    }
}
