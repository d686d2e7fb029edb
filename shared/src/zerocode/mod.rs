//! Run-length coding of zero bytes.
//!
//! A run of `n` zero bytes is written as `0x00, n` with `1 <= n <= 255`;
//! longer runs are split into several pairs. Every other byte is copied
//! through unchanged.

mod error;

pub use error::ZeroCodeError;

/// Largest body `decode` will expand to. Legal packets never come close;
/// anything beyond it is a hostile or corrupted datagram.
pub const MAX_DECODED_SIZE: usize = 8192;

/// Compresses runs of zero bytes
pub fn encode(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len());
    let mut zero_run: u8 = 0;

    for byte in input {
        if *byte == 0 {
            if zero_run == u8::MAX {
                output.push(0);
                output.push(zero_run);
                zero_run = 0;
            }
            zero_run += 1;
            continue;
        }
        if zero_run > 0 {
            output.push(0);
            output.push(zero_run);
            zero_run = 0;
        }
        output.push(*byte);
    }

    if zero_run > 0 {
        output.push(0);
        output.push(zero_run);
    }

    output
}

/// Expands a zero-coded buffer
pub fn decode(input: &[u8]) -> Result<Vec<u8>, ZeroCodeError> {
    decode_with_limit(input, MAX_DECODED_SIZE)
}

pub fn decode_with_limit(input: &[u8], limit: usize) -> Result<Vec<u8>, ZeroCodeError> {
    let mut output = Vec::with_capacity(input.len() * 2);
    let mut index = 0;

    while index < input.len() {
        let byte = input[index];
        index += 1;

        if byte != 0 {
            output.push(byte);
        } else {
            let Some(count) = input.get(index) else {
                return Err(ZeroCodeError::TruncatedRun { offset: index - 1 });
            };
            if *count == 0 {
                return Err(ZeroCodeError::ZeroRunLength { offset: index - 1 });
            }
            index += 1;
            output.resize(output.len() + *count as usize, 0);
        }

        if output.len() > limit {
            return Err(ZeroCodeError::Oversized { limit });
        }
    }

    Ok(output)
}
