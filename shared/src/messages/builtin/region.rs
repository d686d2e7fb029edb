use std::net::{Ipv4Addr, SocketAddrV4};

use serde_json::{json, Value};

use gridlink_serde::{ByteReader, ByteWrite, Serde, SerdeErr, Uuid, Variable1, Variable2};

use crate::{
    messages::{
        message::MessageDecl,
        meta::MessageMeta,
        structured::{block, str_field, u32_field, u64_field, uuid_field},
    },
    packet::MessageNumber,
};

#[derive(Clone, Debug, PartialEq)]
pub struct RegionHandshake {
    pub region_flags: u32,
    pub sim_access: u8,
    pub sim_name: Variable1,
    pub sim_owner: Uuid,
    pub is_estate_manager: bool,
    pub water_height: f32,
    pub billable_factor: f32,
    pub cache_id: Uuid,
    pub region_id: Uuid,
}

impl MessageDecl for RegionHandshake {
    const NAME: &'static str = "RegionHandshake";
    const NUMBER: Option<MessageNumber> = Some(MessageNumber::Low(148));
    const META: MessageMeta = MessageMeta::new().reliable().trusted().zerocoded();

    fn read(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            region_flags: u32::de(reader)?,
            sim_access: u8::de(reader)?,
            sim_name: Variable1::de(reader)?,
            sim_owner: Uuid::de(reader)?,
            is_estate_manager: bool::de(reader)?,
            water_height: f32::de(reader)?,
            billable_factor: f32::de(reader)?,
            cache_id: Uuid::de(reader)?,
            region_id: Uuid::de(reader)?,
        })
    }

    fn write(&self, writer: &mut dyn ByteWrite) {
        self.region_flags.ser(writer);
        self.sim_access.ser(writer);
        self.sim_name.ser(writer);
        self.sim_owner.ser(writer);
        self.is_estate_manager.ser(writer);
        self.water_height.ser(writer);
        self.billable_factor.ser(writer);
        self.cache_id.ser(writer);
        self.region_id.ser(writer);
    }
}

/// Tells the viewer about a neighbouring simulator
#[derive(Clone, Debug, PartialEq)]
pub struct EnableSimulator {
    pub handle: u64,
    pub ip: [u8; 4],
    pub port: u16,
}

impl EnableSimulator {
    pub fn new(handle: u64, address: SocketAddrV4) -> Self {
        Self {
            handle,
            ip: address.ip().octets(),
            port: address.port(),
        }
    }

    pub fn address(&self) -> SocketAddrV4 {
        SocketAddrV4::new(Ipv4Addr::from(self.ip), self.port)
    }
}

impl MessageDecl for EnableSimulator {
    const NAME: &'static str = "EnableSimulator";
    const NUMBER: Option<MessageNumber> = Some(MessageNumber::Low(151));
    const META: MessageMeta = MessageMeta::new().reliable().trusted().alt_transport();

    fn read(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            handle: u64::de(reader)?,
            ip: <[u8; 4]>::de(reader)?,
            port: u16::de(reader)?,
        })
    }

    fn write(&self, writer: &mut dyn ByteWrite) {
        self.handle.ser(writer);
        self.ip.ser(writer);
        self.port.ser(writer);
    }

    fn to_structured(&self) -> Option<Value> {
        Some(json!({
            "SimulatorInfo": [{
                "Handle": self.handle,
                "IP": Ipv4Addr::from(self.ip).to_string(),
                "Port": self.port,
            }]
        }))
    }

    fn from_structured(value: &Value) -> Option<Self> {
        let info = block(value, "SimulatorInfo")?;
        let ip: Ipv4Addr = str_field(info, "IP")?.parse().ok()?;
        Some(Self {
            handle: u64_field(info, "Handle")?,
            ip: ip.octets(),
            port: u16::try_from(u32_field(info, "Port")?).ok()?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TeleportFinish {
    pub agent_id: Uuid,
    pub location_id: u32,
    pub sim_ip: [u8; 4],
    pub sim_port: u16,
    pub region_handle: u64,
    pub seed_capability: Variable2,
    pub sim_access: u8,
    pub teleport_flags: u32,
}

impl MessageDecl for TeleportFinish {
    const NAME: &'static str = "TeleportFinish";
    const NUMBER: Option<MessageNumber> = Some(MessageNumber::Low(69));
    const META: MessageMeta = MessageMeta::new().reliable().trusted().alt_transport();

    fn read(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            agent_id: Uuid::de(reader)?,
            location_id: u32::de(reader)?,
            sim_ip: <[u8; 4]>::de(reader)?,
            sim_port: u16::de(reader)?,
            region_handle: u64::de(reader)?,
            seed_capability: Variable2::de(reader)?,
            sim_access: u8::de(reader)?,
            teleport_flags: u32::de(reader)?,
        })
    }

    fn write(&self, writer: &mut dyn ByteWrite) {
        self.agent_id.ser(writer);
        self.location_id.ser(writer);
        self.sim_ip.ser(writer);
        self.sim_port.ser(writer);
        self.region_handle.ser(writer);
        self.seed_capability.ser(writer);
        self.sim_access.ser(writer);
        self.teleport_flags.ser(writer);
    }

    fn to_structured(&self) -> Option<Value> {
        Some(json!({
            "Info": [{
                "AgentID": self.agent_id.to_string(),
                "LocationID": self.location_id,
                "SimIP": Ipv4Addr::from(self.sim_ip).to_string(),
                "SimPort": self.sim_port,
                "RegionHandle": self.region_handle,
                "SeedCapability": self.seed_capability.to_string_lossy(),
                "SimAccess": self.sim_access,
                "TeleportFlags": self.teleport_flags,
            }]
        }))
    }

    fn from_structured(value: &Value) -> Option<Self> {
        let info = block(value, "Info")?;
        let sim_ip: Ipv4Addr = str_field(info, "SimIP")?.parse().ok()?;
        Some(Self {
            agent_id: uuid_field(info, "AgentID")?,
            location_id: u32_field(info, "LocationID")?,
            sim_ip: sim_ip.octets(),
            sim_port: u16::try_from(u32_field(info, "SimPort")?).ok()?,
            region_handle: u64_field(info, "RegionHandle")?,
            seed_capability: Variable2::from_str_truncated(str_field(info, "SeedCapability")?),
            sim_access: u8::try_from(u32_field(info, "SimAccess")?).ok()?,
            teleport_flags: u32_field(info, "TeleportFlags")?,
        })
    }
}

/// Hands the viewer the seed capability of a neighbour. Only ever travels
/// over the event queue.
#[derive(Clone, Debug, PartialEq)]
pub struct EstablishAgentCommunication {
    pub agent_id: Uuid,
    pub sim_ip_and_port: String,
    pub seed_capability: String,
}

impl MessageDecl for EstablishAgentCommunication {
    const NAME: &'static str = "EstablishAgentCommunication";
    const NUMBER: Option<MessageNumber> = None;
    const META: MessageMeta = MessageMeta::new().trusted().alt_transport();

    fn read(_reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Err(SerdeErr)
    }

    fn write(&self, _writer: &mut dyn ByteWrite) {}

    fn to_structured(&self) -> Option<Value> {
        Some(json!({
            "agent-id": self.agent_id.to_string(),
            "sim-ip-and-port": self.sim_ip_and_port,
            "seed-capability": self.seed_capability,
        }))
    }

    fn from_structured(value: &Value) -> Option<Self> {
        let body = value.as_object()?;
        Some(Self {
            agent_id: uuid_field(body, "agent-id")?,
            sim_ip_and_port: str_field(body, "sim-ip-and-port")?.to_string(),
            seed_capability: str_field(body, "seed-capability")?.to_string(),
        })
    }
}
