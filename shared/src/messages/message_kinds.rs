use std::collections::HashMap;

use log::trace;
use serde_json::{json, Value};

use gridlink_serde::{ByteReader, ByteWriter, SerdeErr};

use crate::{
    messages::{
        error::{MessageError, MessageKindsError},
        message::{Message, MessageDecl},
        message_container::MessageContainer,
        message_kind::MessageKind,
        meta::MessageMeta,
    },
    packet::{MessageNumber, Packet, PacketFlags},
    types::SequenceNumber,
};

type ReadFn = fn(&mut ByteReader) -> Result<Box<dyn Message>, SerdeErr>;
type ReadStructuredFn = fn(&Value) -> Option<Box<dyn Message>>;

struct MessageEntry {
    name: &'static str,
    number: Option<MessageNumber>,
    meta: MessageMeta,
    read: ReadFn,
    read_structured: ReadStructuredFn,
}

fn read_boxed<M: MessageDecl>(reader: &mut ByteReader) -> Result<Box<dyn Message>, SerdeErr> {
    Ok(Box::new(M::read(reader)?))
}

fn read_structured_boxed<M: MessageDecl>(value: &Value) -> Option<Box<dyn Message>> {
    M::from_structured(value).map(|message| Box::new(message) as Box<dyn Message>)
}

/// Static table of every message type the protocol speaks
pub struct MessageKinds {
    entries: HashMap<MessageKind, MessageEntry>,
    number_map: HashMap<MessageNumber, MessageKind>,
    name_map: HashMap<&'static str, MessageKind>,
}

impl Default for MessageKinds {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageKinds {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            number_map: HashMap::new(),
            name_map: HashMap::new(),
        }
    }

    /// Panics on a conflicting registration, see `try_add_message`
    pub fn add_message<M: MessageDecl>(&mut self) {
        if let Err(error) = self.try_add_message::<M>() {
            panic!("{}", error);
        }
    }

    pub fn try_add_message<M: MessageDecl>(&mut self) -> Result<(), MessageKindsError> {
        let kind = MessageKind::of::<M>();

        if self.name_map.contains_key(M::NAME) || self.entries.contains_key(&kind) {
            return Err(MessageKindsError::DuplicateName { name: M::NAME });
        }
        match M::NUMBER {
            Some(number) => {
                if !number.is_valid() {
                    return Err(MessageKindsError::InvalidNumber {
                        number,
                        name: M::NAME,
                    });
                }
                if let Some(existing) = self.number_map.get(&number) {
                    return Err(MessageKindsError::DuplicateNumber {
                        number,
                        name: M::NAME,
                        existing: self.entries[existing].name,
                    });
                }
                self.number_map.insert(number, kind);
            }
            None => {
                if !M::META.alt_transport {
                    return Err(MessageKindsError::EventOnlyWithoutAltTransport { name: M::NAME });
                }
            }
        }

        self.name_map.insert(M::NAME, kind);
        self.entries.insert(
            kind,
            MessageEntry {
                name: M::NAME,
                number: M::NUMBER,
                meta: M::META,
                read: read_boxed::<M>,
                read_structured: read_structured_boxed::<M>,
            },
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, kind: &MessageKind) -> bool {
        self.entries.contains_key(kind)
    }

    pub fn kind_of_number(&self, number: &MessageNumber) -> Option<MessageKind> {
        self.number_map.get(number).copied()
    }

    pub fn kind_of_name(&self, name: &str) -> Option<MessageKind> {
        self.name_map.get(name).copied()
    }

    pub fn meta(&self, kind: &MessageKind) -> Option<MessageMeta> {
        self.entries.get(kind).map(|entry| entry.meta)
    }

    pub fn try_meta(&self, kind: &MessageKind) -> Result<MessageMeta, MessageKindsError> {
        self.meta(kind).ok_or(MessageKindsError::MessageKindNotFound)
    }

    pub fn name(&self, kind: &MessageKind) -> Option<&'static str> {
        self.entries.get(kind).map(|entry| entry.name)
    }

    pub fn number(&self, kind: &MessageKind) -> Option<MessageNumber> {
        self.entries.get(kind).and_then(|entry| entry.number)
    }

    /// Reads a message token and the fields that follow it.
    ///
    /// Bytes after the last field are ignored, older viewers pad some
    /// messages.
    pub fn read(&self, reader: &mut ByteReader) -> Result<MessageContainer, MessageError> {
        let number =
            MessageNumber::de(reader).map_err(|_| MessageError::InvalidMessageNumber)?;
        let Some(kind) = self.number_map.get(&number) else {
            return Err(MessageError::UnknownMessageType { number });
        };
        let entry = &self.entries[kind];
        let message = (entry.read)(reader).map_err(|_| MessageError::Decode { name: entry.name })?;
        if !reader.is_empty() {
            trace!(
                "{} left {} trailing bytes unread",
                entry.name,
                reader.remaining()
            );
        }
        Ok(MessageContainer::from_boxed(message))
    }

    /// Reads a complete body, message token first
    pub fn read_body(&self, body: &[u8]) -> Result<MessageContainer, MessageError> {
        let mut reader = ByteReader::new(body);
        self.read(&mut reader)
    }

    /// Decodes a message delivered in structured form, keyed by name
    pub fn read_structured(
        &self,
        name: &str,
        body: &Value,
    ) -> Result<MessageContainer, MessageError> {
        let Some(kind) = self.name_map.get(name) else {
            return Err(MessageError::UnknownMessageName {
                name: name.to_string(),
            });
        };
        let entry = &self.entries[kind];
        (entry.read_structured)(body)
            .map(MessageContainer::from_boxed)
            .ok_or(MessageError::StructuredDecode { name: entry.name })
    }

    /// Writes a message token followed by the message fields
    pub fn write(
        &self,
        message: &MessageContainer,
        writer: &mut ByteWriter,
    ) -> Result<(), MessageError> {
        let kind = message.kind();
        let Some(entry) = self.entries.get(&kind) else {
            return Err(MessageKindsError::MessageKindNotFound.into());
        };
        let Some(number) = entry.number else {
            return Err(MessageError::NotUdpDeliverable { name: entry.name });
        };
        number.ser(writer);
        message.write(writer);
        Ok(())
    }

    pub fn encode_body(&self, message: &MessageContainer) -> Result<Vec<u8>, MessageError> {
        let mut writer = ByteWriter::with_capacity(message.byte_length() + 4);
        self.write(message, &mut writer)?;
        Ok(writer.to_bytes())
    }

    /// Wraps a message in an unsent packet, with reliable and zero-coded
    /// flags taken from its metadata
    pub fn packet_for(
        &self,
        message: &MessageContainer,
        sequence: SequenceNumber,
    ) -> Result<Packet, MessageError> {
        let body = self.encode_body(message)?;
        let meta = message.meta();
        let mut flags = PacketFlags::NONE;
        flags.set(PacketFlags::RELIABLE, meta.reliable);
        flags.set(PacketFlags::ZEROCODED, meta.zerocoded);
        Ok(Packet::new(flags, sequence, body))
    }

    /// Encodes a message into a complete datagram. `extra_flags` are added
    /// to the ones derived from metadata.
    pub fn build_packet(
        &self,
        message: &MessageContainer,
        extra_flags: PacketFlags,
        sequence: SequenceNumber,
        acks: &[SequenceNumber],
    ) -> Result<Vec<u8>, MessageError> {
        let mut packet = self.packet_for(message, sequence)?;
        packet.flags.insert(extra_flags);
        packet.acks = acks.to_vec();
        Ok(packet.to_bytes()?)
    }

    /// Event queue envelope: `{"message": name, "body": {...}}`
    pub fn to_structured(&self, message: &MessageContainer) -> Result<Value, MessageError> {
        let meta = message.meta();
        if !meta.alt_transport {
            return Err(MessageError::NotAltTransport {
                name: message.name(),
            });
        }
        let body = message.to_structured().ok_or(MessageError::NotAltTransport {
            name: message.name(),
        })?;
        Ok(json!({ "message": message.name(), "body": body }))
    }
}
