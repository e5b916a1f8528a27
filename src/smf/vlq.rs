//! MIDI variable-length quantities

use super::cursor::ByteCursor;
use crate::error::{DecodeError, DecodeResult};

/// Longest VLQ allowed in an SMF
pub const MAX_VLQ_BYTES: usize = 4;

/// Largest value a 4-byte VLQ can hold
pub const MAX_VLQ_VALUE: u32 = 0x0FFF_FFFF;

/// Decode a VLQ (most significant 7-bit group first)
///
/// Fails with `Truncated` if the data ends mid-sequence and with `MalformedVlq`
/// if the fourth byte still has its continuation bit set.
pub fn decode_vlq(cursor: &mut ByteCursor<'_>) -> DecodeResult<u32> {
    let start = cursor.position();
    let mut value: u32 = 0;

    for _ in 0..MAX_VLQ_BYTES {
        let byte = cursor.read_u8()?;
        value = (value << 7) | u32::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }

    Err(DecodeError::MalformedVlq { position: start })
}

/// Encode a value as a minimal VLQ
///
/// Returns `None` for values that do not fit in four bytes.
pub fn encode_vlq(value: u32) -> Option<Vec<u8>> {
    if value > MAX_VLQ_VALUE {
        return None;
    }

    let mut bytes = vec![(value & 0x7F) as u8];
    let mut rest = value >> 7;
    while rest > 0 {
        bytes.push(0x80 | (rest & 0x7F) as u8);
        rest >>= 7;
    }
    bytes.reverse();
    Some(bytes)
}
