use crate::{error::SerdeErr, reader::ByteReader, serde::Serde, writer::ByteWrite};

/// Repeated sub-record, prefixed with a one byte count
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VariableBlock<T: Serde> {
    items: Vec<T>,
}

impl<T: Serde> VariableBlock<T> {
    pub const MAX_ITEMS: usize = u8::MAX as usize;

    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Returns `None` when more items are given than the count prefix can
    /// describe
    pub fn from_vec(items: Vec<T>) -> Option<Self> {
        if items.len() > Self::MAX_ITEMS {
            return None;
        }
        Some(Self { items })
    }

    /// Returns the item back when the block is full
    pub fn try_push(&mut self, item: T) -> Result<(), T> {
        if self.items.len() >= Self::MAX_ITEMS {
            return Err(item);
        }
        self.items.push(item);
        Ok(())
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Serde> Serde for VariableBlock<T> {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        writer.write_byte(self.items.len() as u8);
        for item in &self.items {
            item.ser(writer);
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let count = reader.read_byte()? as usize;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(T::de(reader)?);
        }
        Ok(Self { items })
    }

    fn byte_length(&self) -> usize {
        1 + self.items.iter().map(Serde::byte_length).sum::<usize>()
    }
}
