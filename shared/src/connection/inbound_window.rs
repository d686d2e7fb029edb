use crate::{types::SequenceNumber, wrapping_number::wrapping_diff};

/// How far behind the highest sequence a packet is still recognised
pub const WINDOW_SIZE: usize = 1024;
const WORDS: usize = WINDOW_SIZE / 64;

/// Result of seeing an inbound sequence number
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InboundClass {
    /// Never seen before, dispatch it
    New,
    /// Already seen, ack again but do not dispatch
    Duplicate,
    /// Too old to tell, drop it
    Stale,
}

/// Highest inbound sequence plus a bitset of the ones behind it. Bit `n`
/// records `highest - n`.
pub struct InboundWindow {
    highest: Option<SequenceNumber>,
    seen: [u64; WORDS],
}

impl Default for InboundWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl InboundWindow {
    pub fn new() -> Self {
        Self {
            highest: None,
            seen: [0; WORDS],
        }
    }

    pub fn highest(&self) -> Option<SequenceNumber> {
        self.highest
    }

    pub fn classify(&self, sequence: SequenceNumber) -> InboundClass {
        let Some(highest) = self.highest else {
            return InboundClass::New;
        };
        let diff = wrapping_diff(highest, sequence);
        if diff > 0 {
            return InboundClass::New;
        }
        let offset = diff.unsigned_abs() as usize;
        if offset >= WINDOW_SIZE {
            return InboundClass::Stale;
        }
        if self.is_set(offset) {
            InboundClass::Duplicate
        } else {
            InboundClass::New
        }
    }

    /// Classifies and marks `sequence` as seen
    pub fn record(&mut self, sequence: SequenceNumber) -> InboundClass {
        let class = self.classify(sequence);
        if class != InboundClass::New {
            return class;
        }
        match self.highest {
            None => {
                self.highest = Some(sequence);
                self.set(0);
            }
            Some(highest) => {
                let diff = wrapping_diff(highest, sequence);
                if diff > 0 {
                    self.shift(diff as usize);
                    self.highest = Some(sequence);
                    self.set(0);
                } else {
                    self.set(diff.unsigned_abs() as usize);
                }
            }
        }
        class
    }

    pub fn clear(&mut self) {
        self.highest = None;
        self.seen = [0; WORDS];
    }

    fn is_set(&self, offset: usize) -> bool {
        self.seen[offset / 64] & (1 << (offset % 64)) != 0
    }

    fn set(&mut self, offset: usize) {
        self.seen[offset / 64] |= 1 << (offset % 64);
    }

    /// Moves every recorded bit `by` offsets further from the head
    fn shift(&mut self, by: usize) {
        if by >= WINDOW_SIZE {
            self.seen = [0; WORDS];
            return;
        }
        let word_shift = by / 64;
        let bit_shift = by % 64;
        for index in (0..WORDS).rev() {
            let mut word = 0;
            if index >= word_shift {
                let source = index - word_shift;
                word = self.seen[source] << bit_shift;
                if bit_shift > 0 && source > 0 {
                    word |= self.seen[source - 1] >> (64 - bit_shift);
                }
            }
            self.seen[index] = word;
        }
    }
}
