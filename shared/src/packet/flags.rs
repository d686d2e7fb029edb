use std::{fmt, ops};

/// The first byte of every datagram
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PacketFlags(u8);

impl PacketFlags {
    pub const NONE: Self = Self(0);
    pub const RELIABLE: Self = Self(0x01);
    pub const RESENT: Self = Self(0x02);
    pub const ZEROCODED: Self = Self(0x04);
    pub const ACK_APPENDED: Self = Self(0x08);

    /// Unknown bits are kept as-is
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    pub fn set(&mut self, other: Self, value: bool) {
        if value {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }

    pub const fn is_reliable(self) -> bool {
        self.contains(Self::RELIABLE)
    }

    pub const fn is_resent(self) -> bool {
        self.contains(Self::RESENT)
    }

    pub const fn is_zerocoded(self) -> bool {
        self.contains(Self::ZEROCODED)
    }

    pub const fn has_acks(self) -> bool {
        self.contains(Self::ACK_APPENDED)
    }
}

impl ops::BitOr for PacketFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for PacketFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.is_reliable() {
            names.push("RELIABLE");
        }
        if self.is_resent() {
            names.push("RESENT");
        }
        if self.is_zerocoded() {
            names.push("ZEROCODED");
        }
        if self.has_acks() {
            names.push("ACK_APPENDED");
        }
        write!(f, "PacketFlags({:#04x} {})", self.0, names.join("|"))
    }
}
