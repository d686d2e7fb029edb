/// Largest datagram the transport will emit. Legacy viewers drop anything
/// bigger than this without reassembly.
pub const MTU_SIZE_BYTES: usize = 1200;

pub const MAX_VARIABLE1_LEN: usize = u8::MAX as usize;
pub const MAX_VARIABLE2_LEN: usize = u16::MAX as usize;
