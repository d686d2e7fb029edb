use gridlink_serde::{ByteReader, ByteWrite, Serde, SerdeErr, Uuid, VariableBlock};

use crate::{
    messages::{identity::AgentIdentity, message::MessageDecl, meta::MessageMeta},
    packet::MessageNumber,
    types::{PingId, SequenceNumber},
};

/// First message a viewer sends on a new circuit
#[derive(Clone, Debug, PartialEq)]
pub struct UseCircuitCode {
    pub code: u32,
    pub session_id: Uuid,
    pub agent_id: Uuid,
}

impl MessageDecl for UseCircuitCode {
    const NAME: &'static str = "UseCircuitCode";
    const NUMBER: Option<MessageNumber> = Some(MessageNumber::Low(3));
    const META: MessageMeta = MessageMeta::new().reliable().not_trusted().control();

    fn read(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            code: u32::de(reader)?,
            session_id: Uuid::de(reader)?,
            agent_id: Uuid::de(reader)?,
        })
    }

    fn write(&self, writer: &mut dyn ByteWrite) {
        self.code.ser(writer);
        self.session_id.ser(writer);
        self.agent_id.ser(writer);
    }

    fn identity(&self) -> Option<AgentIdentity> {
        Some(AgentIdentity::new(self.agent_id, self.session_id))
    }
}

/// Standalone acknowledgement of reliable packets
#[derive(Clone, Debug, PartialEq, Default)]
pub struct PacketAck {
    pub packets: VariableBlock<SequenceNumber>,
}

impl PacketAck {
    pub const MAX_IDS: usize = VariableBlock::<SequenceNumber>::MAX_ITEMS;

    /// `None` when more ids are given than one message can carry
    pub fn new(ids: Vec<SequenceNumber>) -> Option<Self> {
        VariableBlock::from_vec(ids).map(|packets| Self { packets })
    }

    pub fn ids(&self) -> &[SequenceNumber] {
        self.packets.items()
    }
}

impl MessageDecl for PacketAck {
    const NAME: &'static str = "PacketAck";
    const NUMBER: Option<MessageNumber> = Some(MessageNumber::Fixed(0xFB));
    const META: MessageMeta = MessageMeta::new().control();

    fn read(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            packets: VariableBlock::de(reader)?,
        })
    }

    fn write(&self, writer: &mut dyn ByteWrite) {
        self.packets.ser(writer);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StartPingCheck {
    pub ping_id: PingId,
    /// Oldest reliable sequence the sender is still waiting on
    pub oldest_unacked: SequenceNumber,
}

impl MessageDecl for StartPingCheck {
    const NAME: &'static str = "StartPingCheck";
    const NUMBER: Option<MessageNumber> = Some(MessageNumber::High(1));
    const META: MessageMeta = MessageMeta::new().control();

    fn read(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            ping_id: u8::de(reader)?,
            oldest_unacked: u32::de(reader)?,
        })
    }

    fn write(&self, writer: &mut dyn ByteWrite) {
        self.ping_id.ser(writer);
        self.oldest_unacked.ser(writer);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompletePingCheck {
    pub ping_id: PingId,
}

impl MessageDecl for CompletePingCheck {
    const NAME: &'static str = "CompletePingCheck";
    const NUMBER: Option<MessageNumber> = Some(MessageNumber::High(2));
    const META: MessageMeta = MessageMeta::new().control();

    fn read(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            ping_id: u8::de(reader)?,
        })
    }

    fn write(&self, writer: &mut dyn ByteWrite) {
        self.ping_id.ser(writer);
    }
}

/// Tears the circuit down from either side. Carries no fields.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct CloseCircuit;

impl MessageDecl for CloseCircuit {
    const NAME: &'static str = "CloseCircuit";
    const NUMBER: Option<MessageNumber> = Some(MessageNumber::Fixed(0xFD));
    const META: MessageMeta = MessageMeta::new().control();

    fn read(_reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self)
    }

    fn write(&self, _writer: &mut dyn ByteWrite) {}
}
