use gridlink_serde::{
    ByteReader, ByteWrite, Serde, SerdeErr, Uuid, Variable1, Variable2, VariableBlock,
};

use crate::{
    connection::throttle::ThrottleCategory,
    messages::{identity::AgentIdentity, message::MessageDecl, meta::MessageMeta},
    packet::MessageNumber,
};

#[derive(Clone, Debug, PartialEq)]
pub struct LogoutRequest {
    pub agent_id: Uuid,
    pub session_id: Uuid,
}

impl MessageDecl for LogoutRequest {
    const NAME: &'static str = "LogoutRequest";
    const NUMBER: Option<MessageNumber> = Some(MessageNumber::Low(252));
    const META: MessageMeta = MessageMeta::new().reliable().not_trusted().control();

    fn read(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            agent_id: Uuid::de(reader)?,
            session_id: Uuid::de(reader)?,
        })
    }

    fn write(&self, writer: &mut dyn ByteWrite) {
        self.agent_id.ser(writer);
        self.session_id.ser(writer);
    }

    fn identity(&self) -> Option<AgentIdentity> {
        Some(AgentIdentity::new(self.agent_id, self.session_id))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogoutReply {
    pub agent_id: Uuid,
    pub session_id: Uuid,
    /// Inventory items the viewer should refresh on its way out
    pub items: VariableBlock<Uuid>,
}

impl LogoutReply {
    pub fn new(agent_id: Uuid, session_id: Uuid) -> Self {
        Self {
            agent_id,
            session_id,
            items: VariableBlock::new(),
        }
    }
}

impl MessageDecl for LogoutReply {
    const NAME: &'static str = "LogoutReply";
    const NUMBER: Option<MessageNumber> = Some(MessageNumber::Low(253));
    const META: MessageMeta = MessageMeta::new()
        .reliable()
        .trusted()
        .zerocoded()
        .control();

    fn read(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            agent_id: Uuid::de(reader)?,
            session_id: Uuid::de(reader)?,
            items: VariableBlock::de(reader)?,
        })
    }

    fn write(&self, writer: &mut dyn ByteWrite) {
        self.agent_id.ser(writer);
        self.session_id.ser(writer);
        self.items.ser(writer);
    }
}

/// Sent right before the simulator closes a circuit, so it is not tracked
/// for resend
#[derive(Clone, Debug, PartialEq)]
pub struct KickUser {
    pub target_ip: [u8; 4],
    pub target_port: u16,
    pub agent_id: Uuid,
    pub session_id: Uuid,
    pub reason: Variable2,
}

impl MessageDecl for KickUser {
    const NAME: &'static str = "KickUser";
    const NUMBER: Option<MessageNumber> = Some(MessageNumber::Low(163));
    const META: MessageMeta = MessageMeta::new().trusted().control();

    fn read(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            target_ip: <[u8; 4]>::de(reader)?,
            target_port: u16::de(reader)?,
            agent_id: Uuid::de(reader)?,
            session_id: Uuid::de(reader)?,
            reason: Variable2::de(reader)?,
        })
    }

    fn write(&self, writer: &mut dyn ByteWrite) {
        self.target_ip.ser(writer);
        self.target_port.ser(writer);
        self.agent_id.ser(writer);
        self.session_id.ser(writer);
        self.reason.ser(writer);
    }
}

/// Viewer's requested bandwidth split, in bits per second
#[derive(Clone, Debug, PartialEq)]
pub struct AgentThrottle {
    pub agent_id: Uuid,
    pub session_id: Uuid,
    pub circuit_code: u32,
    pub gen_counter: u32,
    /// Seven little-endian `f32`s, one per throttle category
    pub throttles: Variable1,
}

impl AgentThrottle {
    const RATES_LEN: usize = ThrottleCategory::COUNT * 4;

    pub fn new(
        agent_id: Uuid,
        session_id: Uuid,
        circuit_code: u32,
        bits_per_second: [f32; ThrottleCategory::COUNT],
    ) -> Self {
        let bytes: Vec<u8> = bits_per_second
            .iter()
            .flat_map(|rate| rate.to_le_bytes())
            .collect();
        Self {
            agent_id,
            session_id,
            circuit_code,
            gen_counter: 0,
            throttles: Variable1::try_new(bytes).unwrap_or_default(),
        }
    }

    /// Requested rates converted to bytes per second, `None` if the block
    /// is not seven floats
    pub fn bytes_per_second(&self) -> Option<[f32; ThrottleCategory::COUNT]> {
        let bytes = self.throttles.as_bytes();
        if bytes.len() < Self::RATES_LEN {
            return None;
        }
        let mut rates = [0.0; ThrottleCategory::COUNT];
        for (rate, chunk) in rates.iter_mut().zip(bytes.chunks_exact(4)) {
            let bits = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            *rate = bits / 8.0;
        }
        Some(rates)
    }
}

impl MessageDecl for AgentThrottle {
    const NAME: &'static str = "AgentThrottle";
    const NUMBER: Option<MessageNumber> = Some(MessageNumber::Low(81));
    const META: MessageMeta = MessageMeta::new()
        .reliable()
        .not_trusted()
        .zerocoded()
        .control();

    fn read(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            agent_id: Uuid::de(reader)?,
            session_id: Uuid::de(reader)?,
            circuit_code: u32::de(reader)?,
            gen_counter: u32::de(reader)?,
            throttles: Variable1::de(reader)?,
        })
    }

    fn write(&self, writer: &mut dyn ByteWrite) {
        self.agent_id.ser(writer);
        self.session_id.ser(writer);
        self.circuit_code.ser(writer);
        self.gen_counter.ser(writer);
        self.throttles.ser(writer);
    }

    fn identity(&self) -> Option<AgentIdentity> {
        Some(AgentIdentity::new(self.agent_id, self.session_id))
    }
}
