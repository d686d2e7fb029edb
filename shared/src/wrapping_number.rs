use crate::types::SequenceNumber;

/// Sequence numbers live in `0..SEQUENCE_MODULUS` and wrap back to 0.
pub const SEQUENCE_MODULUS: u32 = 0x0100_0000;
const SEQUENCE_MASK: u32 = SEQUENCE_MODULUS - 1;
const HALF_SPACE: u32 = SEQUENCE_MODULUS / 2;

/// Returns the sequence number following `sequence`, wrapping at the modulus
pub fn next_sequence(sequence: SequenceNumber) -> SequenceNumber {
    sequence.wrapping_add(1) & SEQUENCE_MASK
}

pub fn is_valid_sequence(sequence: SequenceNumber) -> bool {
    sequence < SEQUENCE_MODULUS
}

/// Returns whether or not a wrapping sequence number is greater than another
/// sequence_greater_than(2,1) will return true
/// sequence_greater_than(1,2) will return false
/// sequence_greater_than(1,1) will return false
pub fn sequence_greater_than(s1: SequenceNumber, s2: SequenceNumber) -> bool {
    ((s1 > s2) && (s1 - s2 <= HALF_SPACE)) || ((s1 < s2) && (s2 - s1 > HALF_SPACE))
}

/// sequence_less_than(1,2) will return true
/// sequence_less_than(2,1) will return false
/// sequence_less_than(1,1) will return false
pub fn sequence_less_than(s1: SequenceNumber, s2: SequenceNumber) -> bool {
    sequence_greater_than(s2, s1)
}

/// Signed distance from `a` to `b` across the wrap point.
///
/// # Examples
/// ```
/// # use gridlink_shared::wrapping_diff;
/// assert_eq!(wrapping_diff(1, 2), 1);
/// assert_eq!(wrapping_diff(2, 1), -1);
/// assert_eq!(wrapping_diff(0x00FF_FFFF, 0), 1);
/// assert_eq!(wrapping_diff(0, 0x00FF_FFFF), -1);
/// ```
pub fn wrapping_diff(a: SequenceNumber, b: SequenceNumber) -> i32 {
    let distance = b.wrapping_sub(a) & SEQUENCE_MASK;
    if distance > HALF_SPACE {
        distance as i32 - SEQUENCE_MODULUS as i32
    } else {
        distance as i32
    }
}
