use gridlink_serde::{ByteReader, ByteWrite, Serde, SerdeErr, Uuid, Variable2};

use crate::{
    connection::throttle::ThrottleCategory,
    messages::{message::MessageDecl, meta::MessageMeta},
    packet::MessageNumber,
};

/// Compressed terrain patches. The layer type decides which throttle
/// bucket pays for it.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerData {
    pub layer_type: u8,
    pub data: Variable2,
}

impl LayerData {
    pub const LAND: u8 = b'L';
    pub const WIND: u8 = b'7';
    pub const CLOUD: u8 = b'8';
}

impl MessageDecl for LayerData {
    const NAME: &'static str = "LayerData";
    const NUMBER: Option<MessageNumber> = Some(MessageNumber::High(11));
    const META: MessageMeta = MessageMeta::new()
        .reliable()
        .trusted()
        .throttle(ThrottleCategory::Land);

    fn read(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            layer_type: u8::de(reader)?,
            data: Variable2::de(reader)?,
        })
    }

    fn write(&self, writer: &mut dyn ByteWrite) {
        self.layer_type.ser(writer);
        self.data.ser(writer);
    }

    fn throttle_category(&self) -> Option<ThrottleCategory> {
        match self.layer_type {
            Self::WIND => Some(ThrottleCategory::Wind),
            Self::CLOUD => Some(ThrottleCategory::Cloud),
            _ => Some(ThrottleCategory::Land),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImageData {
    pub id: Uuid,
    pub codec: u8,
    pub size: u32,
    pub packets: u16,
    pub data: Variable2,
}

impl MessageDecl for ImageData {
    const NAME: &'static str = "ImageData";
    const NUMBER: Option<MessageNumber> = Some(MessageNumber::Low(9));
    const META: MessageMeta = MessageMeta::new()
        .trusted()
        .throttle(ThrottleCategory::Texture);

    fn read(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            id: Uuid::de(reader)?,
            codec: u8::de(reader)?,
            size: u32::de(reader)?,
            packets: u16::de(reader)?,
            data: Variable2::de(reader)?,
        })
    }

    fn write(&self, writer: &mut dyn ByteWrite) {
        self.id.ser(writer);
        self.codec.ser(writer);
        self.size.ser(writer);
        self.packets.ser(writer);
        self.data.ser(writer);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransferPacket {
    pub transfer_id: Uuid,
    pub channel_type: i32,
    pub packet: i32,
    pub status: i32,
    pub data: Variable2,
}

impl MessageDecl for TransferPacket {
    const NAME: &'static str = "TransferPacket";
    const NUMBER: Option<MessageNumber> = Some(MessageNumber::High(17));
    const META: MessageMeta = MessageMeta::new()
        .reliable()
        .trusted()
        .throttle(ThrottleCategory::Asset);

    fn read(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            transfer_id: Uuid::de(reader)?,
            channel_type: i32::de(reader)?,
            packet: i32::de(reader)?,
            status: i32::de(reader)?,
            data: Variable2::de(reader)?,
        })
    }

    fn write(&self, writer: &mut dyn ByteWrite) {
        self.transfer_id.ser(writer);
        self.channel_type.ser(writer);
        self.packet.ser(writer);
        self.status.ser(writer);
        self.data.ser(writer);
    }
}
