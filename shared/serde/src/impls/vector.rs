use crate::{
    error::SerdeErr, reader::ByteReader, serde::ConstByteLength, serde::Serde, writer::ByteWrite,
};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Serde for Vector3 {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        self.x.ser(writer);
        self.y.ser(writer);
        self.z.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            x: f32::de(reader)?,
            y: f32::de(reader)?,
            z: f32::de(reader)?,
        })
    }

    fn byte_length(&self) -> usize {
        12
    }
}

impl ConstByteLength for Vector3 {
    fn const_byte_length() -> usize {
        12
    }
}

/// Double precision vector, used for global (grid-wide) positions
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3d {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl Serde for Vector3d {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        self.x.ser(writer);
        self.y.ser(writer);
        self.z.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            x: f64::de(reader)?,
            y: f64::de(reader)?,
            z: f64::de(reader)?,
        })
    }

    fn byte_length(&self) -> usize {
        24
    }
}

/// Unit quaternion sent packed as (x, y, z); `w` is rebuilt on read and is
/// always non-negative, so callers should normalize to `w >= 0` first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Serde for Quaternion {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        let (x, y, z) = if self.w < 0.0 {
            (-self.x, -self.y, -self.z)
        } else {
            (self.x, self.y, self.z)
        };
        x.ser(writer);
        y.ser(writer);
        z.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let x = f32::de(reader)?;
        let y = f32::de(reader)?;
        let z = f32::de(reader)?;
        let square = 1.0 - (x * x + y * y + z * z);
        let w = if square > 0.0 { square.sqrt() } else { 0.0 };
        Ok(Self { x, y, z, w })
    }

    fn byte_length(&self) -> usize {
        12
    }
}

impl ConstByteLength for Quaternion {
    fn const_byte_length() -> usize {
        12
    }
}
