use gridlink_serde::MTU_SIZE_BYTES;

use crate::{
    packet::{EnvelopeError, PacketFlags},
    types::SequenceNumber,
    wrapping_number::is_valid_sequence,
    zerocode,
};

/// flags + sequence + extra header length
pub const MIN_HEADER_SIZE: usize = 6;
pub const ACK_SIZE: usize = 4;
pub const MAX_APPENDED_ACKS: usize = u8::MAX as usize;

/// One datagram, with its body already expanded
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    pub flags: PacketFlags,
    pub sequence: SequenceNumber,
    pub extra_header: Vec<u8>,
    /// Message token followed by the message fields, never zero-coded
    pub body: Vec<u8>,
    pub acks: Vec<SequenceNumber>,
}

impl Packet {
    pub fn new(flags: PacketFlags, sequence: SequenceNumber, body: Vec<u8>) -> Self {
        Self {
            flags,
            sequence,
            extra_header: Vec::new(),
            body,
            acks: Vec::new(),
        }
    }

    pub fn is_reliable(&self) -> bool {
        self.flags.is_reliable()
    }

    /// Reads a datagram off the wire.
    ///
    /// Appended acks are read from the end of the buffer: the final byte is
    /// the count, preceded by that many big-endian sequence numbers.
    pub fn parse(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        let length = bytes.len();
        if length < MIN_HEADER_SIZE {
            return Err(EnvelopeError::TooShort {
                length,
                minimum: MIN_HEADER_SIZE,
            });
        }

        let flags = PacketFlags::from_bits(bytes[0]);
        let sequence = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
        if !is_valid_sequence(sequence) {
            return Err(EnvelopeError::SequenceOutOfRange { sequence });
        }

        let extra_length = bytes[5] as usize;
        let body_start = MIN_HEADER_SIZE + extra_length;
        if body_start > length {
            return Err(EnvelopeError::ExtraHeaderOverrun {
                declared: extra_length,
                length,
            });
        }
        let extra_header = bytes[MIN_HEADER_SIZE..body_start].to_vec();

        let mut body_end = length;
        let mut acks = Vec::new();
        if flags.has_acks() {
            let count = bytes[length - 1] as usize;
            let ack_bytes = count * ACK_SIZE + 1;
            if body_start + ack_bytes > length {
                return Err(EnvelopeError::AckListOverrun { count, length });
            }
            body_end = length - ack_bytes;
            acks = bytes[body_end..length - 1]
                .chunks_exact(ACK_SIZE)
                .map(|chunk| u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect();
        }

        let raw_body = &bytes[body_start..body_end];
        let body = if flags.is_zerocoded() {
            zerocode::decode(raw_body)?
        } else {
            raw_body.to_vec()
        };

        Ok(Self {
            flags,
            sequence,
            extra_header,
            body,
            acks,
        })
    }

    /// Builds a datagram from its parts
    pub fn build(
        flags: PacketFlags,
        sequence: SequenceNumber,
        body: Vec<u8>,
        acks: &[SequenceNumber],
    ) -> Result<Vec<u8>, EnvelopeError> {
        let mut packet = Self::new(flags, sequence, body);
        packet.acks = acks.to_vec();
        packet.to_bytes()
    }

    /// Writes header, body and the packet's own ack list.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EnvelopeError> {
        if self.acks.len() > MAX_APPENDED_ACKS {
            return Err(EnvelopeError::TooManyAcks {
                count: self.acks.len(),
                limit: MAX_APPENDED_ACKS,
            });
        }
        let mut bytes = self.encode()?;
        let appended = Self::append_acks(&mut bytes, &self.acks, self.acks.len());
        if appended < self.acks.len() {
            return Err(EnvelopeError::Oversized {
                length: bytes.len() + (self.acks.len() - appended) * ACK_SIZE,
                limit: MTU_SIZE_BYTES,
            });
        }
        Ok(bytes)
    }

    /// Writes header and body without any acks.
    ///
    /// A body flagged for zero-coding is sent plain (and the flag cleared)
    /// whenever coding would not make it smaller.
    pub fn encode(&self) -> Result<Vec<u8>, EnvelopeError> {
        let mut flags = self.flags;
        flags.remove(PacketFlags::ACK_APPENDED);

        let coded_body = if flags.is_zerocoded() {
            let coded = zerocode::encode(&self.body);
            if coded.len() < self.body.len() {
                Some(coded)
            } else {
                flags.remove(PacketFlags::ZEROCODED);
                None
            }
        } else {
            None
        };
        let body = coded_body.as_deref().unwrap_or(&self.body);

        let extra_length = self.extra_header.len().min(u8::MAX as usize);
        let length = MIN_HEADER_SIZE + extra_length + body.len();
        if length > MTU_SIZE_BYTES {
            return Err(EnvelopeError::Oversized {
                length,
                limit: MTU_SIZE_BYTES,
            });
        }
        if !is_valid_sequence(self.sequence) {
            return Err(EnvelopeError::SequenceOutOfRange {
                sequence: self.sequence,
            });
        }

        let mut bytes = Vec::with_capacity(length + 1);
        bytes.push(flags.bits());
        bytes.extend_from_slice(&self.sequence.to_be_bytes());
        bytes.push(extra_length as u8);
        bytes.extend_from_slice(&self.extra_header[..extra_length]);
        bytes.extend_from_slice(body);
        Ok(bytes)
    }

    /// Appends as many of `acks` as fit within `limit` and the MTU to an
    /// encoded datagram that carries none yet. Returns how many were written.
    pub fn append_acks(bytes: &mut Vec<u8>, acks: &[SequenceNumber], limit: usize) -> usize {
        let Some(first) = bytes.first().copied() else {
            return 0;
        };
        let mut flags = PacketFlags::from_bits(first);
        if flags.has_acks() || acks.is_empty() {
            return 0;
        }

        let room = MTU_SIZE_BYTES.saturating_sub(bytes.len() + 1) / ACK_SIZE;
        let count = acks.len().min(limit).min(room).min(MAX_APPENDED_ACKS);
        if count == 0 {
            return 0;
        }

        for ack in &acks[..count] {
            bytes.extend_from_slice(&ack.to_be_bytes());
        }
        bytes.push(count as u8);
        flags.insert(PacketFlags::ACK_APPENDED);
        bytes[0] = flags.bits();
        count
    }
}
