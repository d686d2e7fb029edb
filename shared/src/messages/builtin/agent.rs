use gridlink_serde::{
    ByteReader, ByteWrite, Quaternion, Serde, SerdeErr, Uuid, Variable1, Variable2, Vector3,
};

use crate::{
    messages::{identity::AgentIdentity, message::MessageDecl, meta::MessageMeta},
    packet::MessageNumber,
};

/// Camera and control state, sent by the viewer many times a second
#[derive(Clone, Debug, PartialEq)]
pub struct AgentUpdate {
    pub agent_id: Uuid,
    pub session_id: Uuid,
    pub body_rotation: Quaternion,
    pub head_rotation: Quaternion,
    pub state: u8,
    pub camera_center: Vector3,
    pub camera_at_axis: Vector3,
    pub camera_left_axis: Vector3,
    pub camera_up_axis: Vector3,
    pub far: f32,
    pub control_flags: u32,
    pub flags: u8,
}

impl AgentUpdate {
    pub fn new(agent_id: Uuid, session_id: Uuid) -> Self {
        Self {
            agent_id,
            session_id,
            body_rotation: Quaternion::IDENTITY,
            head_rotation: Quaternion::IDENTITY,
            state: 0,
            camera_center: Vector3::ZERO,
            camera_at_axis: Vector3::new(1.0, 0.0, 0.0),
            camera_left_axis: Vector3::new(0.0, 1.0, 0.0),
            camera_up_axis: Vector3::new(0.0, 0.0, 1.0),
            far: 64.0,
            control_flags: 0,
            flags: 0,
        }
    }
}

impl MessageDecl for AgentUpdate {
    const NAME: &'static str = "AgentUpdate";
    const NUMBER: Option<MessageNumber> = Some(MessageNumber::High(4));
    const META: MessageMeta = MessageMeta::new().not_trusted().zerocoded();

    fn read(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            agent_id: Uuid::de(reader)?,
            session_id: Uuid::de(reader)?,
            body_rotation: Quaternion::de(reader)?,
            head_rotation: Quaternion::de(reader)?,
            state: u8::de(reader)?,
            camera_center: Vector3::de(reader)?,
            camera_at_axis: Vector3::de(reader)?,
            camera_left_axis: Vector3::de(reader)?,
            camera_up_axis: Vector3::de(reader)?,
            far: f32::de(reader)?,
            control_flags: u32::de(reader)?,
            flags: u8::de(reader)?,
        })
    }

    fn write(&self, writer: &mut dyn ByteWrite) {
        self.agent_id.ser(writer);
        self.session_id.ser(writer);
        self.body_rotation.ser(writer);
        self.head_rotation.ser(writer);
        self.state.ser(writer);
        self.camera_center.ser(writer);
        self.camera_at_axis.ser(writer);
        self.camera_left_axis.ser(writer);
        self.camera_up_axis.ser(writer);
        self.far.ser(writer);
        self.control_flags.ser(writer);
        self.flags.ser(writer);
    }

    fn identity(&self) -> Option<AgentIdentity> {
        Some(AgentIdentity::new(self.agent_id, self.session_id))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatFromViewer {
    pub agent_id: Uuid,
    pub session_id: Uuid,
    pub message: Variable2,
    pub chat_type: u8,
    pub channel: i32,
}

impl MessageDecl for ChatFromViewer {
    const NAME: &'static str = "ChatFromViewer";
    const NUMBER: Option<MessageNumber> = Some(MessageNumber::Low(80));
    const META: MessageMeta = MessageMeta::new().reliable().not_trusted().zerocoded();

    fn read(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            agent_id: Uuid::de(reader)?,
            session_id: Uuid::de(reader)?,
            message: Variable2::de(reader)?,
            chat_type: u8::de(reader)?,
            channel: i32::de(reader)?,
        })
    }

    fn write(&self, writer: &mut dyn ByteWrite) {
        self.agent_id.ser(writer);
        self.session_id.ser(writer);
        self.message.ser(writer);
        self.chat_type.ser(writer);
        self.channel.ser(writer);
    }

    fn identity(&self) -> Option<AgentIdentity> {
        Some(AgentIdentity::new(self.agent_id, self.session_id))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImprovedInstantMessage {
    pub agent_id: Uuid,
    pub session_id: Uuid,
    pub from_group: bool,
    pub to_agent_id: Uuid,
    pub parent_estate_id: u32,
    pub region_id: Uuid,
    pub position: Vector3,
    pub offline: u8,
    pub dialog: u8,
    pub id: Uuid,
    pub timestamp: u32,
    pub from_agent_name: Variable1,
    pub message: Variable2,
    pub binary_bucket: Variable2,
}

impl MessageDecl for ImprovedInstantMessage {
    const NAME: &'static str = "ImprovedInstantMessage";
    const NUMBER: Option<MessageNumber> = Some(MessageNumber::Low(254));
    const META: MessageMeta = MessageMeta::new().reliable().not_trusted().zerocoded();

    fn read(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            agent_id: Uuid::de(reader)?,
            session_id: Uuid::de(reader)?,
            from_group: bool::de(reader)?,
            to_agent_id: Uuid::de(reader)?,
            parent_estate_id: u32::de(reader)?,
            region_id: Uuid::de(reader)?,
            position: Vector3::de(reader)?,
            offline: u8::de(reader)?,
            dialog: u8::de(reader)?,
            id: Uuid::de(reader)?,
            timestamp: u32::de(reader)?,
            from_agent_name: Variable1::de(reader)?,
            message: Variable2::de(reader)?,
            binary_bucket: Variable2::de(reader)?,
        })
    }

    fn write(&self, writer: &mut dyn ByteWrite) {
        self.agent_id.ser(writer);
        self.session_id.ser(writer);
        self.from_group.ser(writer);
        self.to_agent_id.ser(writer);
        self.parent_estate_id.ser(writer);
        self.region_id.ser(writer);
        self.position.ser(writer);
        self.offline.ser(writer);
        self.dialog.ser(writer);
        self.id.ser(writer);
        self.timestamp.ser(writer);
        self.from_agent_name.ser(writer);
        self.message.ser(writer);
        self.binary_bucket.ser(writer);
    }

    fn identity(&self) -> Option<AgentIdentity> {
        Some(AgentIdentity::new(self.agent_id, self.session_id))
    }
}

/// Viewer is ready to be placed in the region
#[derive(Clone, Debug, PartialEq)]
pub struct CompleteAgentMovement {
    pub agent_id: Uuid,
    pub session_id: Uuid,
    pub circuit_code: u32,
}

impl MessageDecl for CompleteAgentMovement {
    const NAME: &'static str = "CompleteAgentMovement";
    const NUMBER: Option<MessageNumber> = Some(MessageNumber::Low(249));
    const META: MessageMeta = MessageMeta::new().reliable().not_trusted();

    fn read(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            agent_id: Uuid::de(reader)?,
            session_id: Uuid::de(reader)?,
            circuit_code: u32::de(reader)?,
        })
    }

    fn write(&self, writer: &mut dyn ByteWrite) {
        self.agent_id.ser(writer);
        self.session_id.ser(writer);
        self.circuit_code.ser(writer);
    }

    fn identity(&self) -> Option<AgentIdentity> {
        Some(AgentIdentity::new(self.agent_id, self.session_id))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AgentMovementComplete {
    pub agent_id: Uuid,
    pub session_id: Uuid,
    pub position: Vector3,
    pub look_at: Vector3,
    pub region_handle: u64,
    pub timestamp: u32,
    pub channel_version: Variable2,
}

impl MessageDecl for AgentMovementComplete {
    const NAME: &'static str = "AgentMovementComplete";
    const NUMBER: Option<MessageNumber> = Some(MessageNumber::Low(250));
    const META: MessageMeta = MessageMeta::new().reliable().trusted();

    fn read(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            agent_id: Uuid::de(reader)?,
            session_id: Uuid::de(reader)?,
            position: Vector3::de(reader)?,
            look_at: Vector3::de(reader)?,
            region_handle: u64::de(reader)?,
            timestamp: u32::de(reader)?,
            channel_version: Variable2::de(reader)?,
        })
    }

    fn write(&self, writer: &mut dyn ByteWrite) {
        self.agent_id.ser(writer);
        self.session_id.ser(writer);
        self.position.ser(writer);
        self.look_at.ser(writer);
        self.region_handle.ser(writer);
        self.timestamp.ser(writer);
        self.channel_version.ser(writer);
    }
}
