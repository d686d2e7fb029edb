use thiserror::Error;

use crate::{sequence_less_than, types::SequenceNumber};

/// Errors that can occur during SequenceList operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// Attempted to insert a duplicate ID into the sequence list
    #[error("Duplicate sequence ID {id} not allowed in SequenceList")]
    DuplicateId { id: SequenceNumber },
}

/// List of items kept sorted by wrapping sequence number, oldest first.
/// Items mostly arrive in order, so inserts and lookups scan from the back.
pub struct SequenceList<T> {
    list: Vec<(SequenceNumber, T)>,
}

impl<T> Default for SequenceList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SequenceList<T> {
    pub fn new() -> Self {
        Self { list: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn front(&self) -> Option<&(SequenceNumber, T)> {
        self.list.first()
    }

    pub fn contains_scan_from_back(&self, id: &SequenceNumber) -> bool {
        self.position_scan_from_back(id).is_some()
    }

    pub fn get_mut_scan_from_back(&mut self, id: &SequenceNumber) -> Option<&mut T> {
        let index = self.position_scan_from_back(id)?;
        self.list.get_mut(index).map(|(_, item)| item)
    }

    /// Attempts to insert an item with the given ID, scanning from the back.
    /// Returns an error if the ID already exists.
    pub fn try_insert_scan_from_back(
        &mut self,
        id: SequenceNumber,
        item: T,
    ) -> Result<(), SequenceError> {
        let mut index = self.list.len();
        while index > 0 {
            let old_id = self.list[index - 1].0;
            if old_id == id {
                return Err(SequenceError::DuplicateId { id });
            }
            if sequence_less_than(old_id, id) {
                break;
            }
            index -= 1;
        }
        self.list.insert(index, (id, item));
        Ok(())
    }

    pub fn remove_scan_from_front(&mut self, id: &SequenceNumber) -> Option<T> {
        let index = self.list.iter().position(|(old_id, _)| old_id == id)?;
        Some(self.list.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(SequenceNumber, T)> {
        self.list.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut (SequenceNumber, T)> {
        self.list.iter_mut()
    }

    /// Removes and returns every item for which `predicate` is true
    pub fn drain_where<F: FnMut(&SequenceNumber, &T) -> bool>(
        &mut self,
        mut predicate: F,
    ) -> Vec<(SequenceNumber, T)> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.list.len());
        for (id, item) in self.list.drain(..) {
            if predicate(&id, &item) {
                removed.push((id, item));
            } else {
                kept.push((id, item));
            }
        }
        self.list = kept;
        removed
    }

    pub fn clear(&mut self) {
        self.list.clear();
    }

    fn position_scan_from_back(&self, id: &SequenceNumber) -> Option<usize> {
        for index in (0..self.list.len()).rev() {
            let old_id = self.list[index].0;
            if old_id == *id {
                return Some(index);
            }
            if sequence_less_than(old_id, *id) {
                return None;
            }
        }
        None
    }
}
