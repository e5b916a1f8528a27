//! Top-level SMF chunk framing

use super::cursor::ByteCursor;
use crate::error::DecodeResult;

/// Chunk type tags
pub mod tag {
    pub const HEADER: [u8; 4] = *b"MThd";
    pub const TRACK: [u8; 4] = *b"MTrk";
}

/// One length-prefixed chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRecord<'a> {
    pub kind: [u8; 4],
    pub length: u32,
    /// Absolute offset of the first payload byte
    pub offset: usize,
    pub payload: &'a [u8],
}

impl ChunkRecord<'_> {
    pub fn is_track(&self) -> bool {
        self.kind == tag::TRACK
    }

    /// Chunk tag for log output
    pub fn kind_str(&self) -> String {
        String::from_utf8_lossy(&self.kind).into_owned()
    }
}

/// Read the next chunk, including its whole payload
///
/// Fails with `Truncated` if the prefix or the declared payload runs past the
/// end of the data.
pub fn read_chunk<'a>(cursor: &mut ByteCursor<'a>) -> DecodeResult<ChunkRecord<'a>> {
    let kind = cursor.read_tag()?;
    let length = cursor.read_u32_be()?;
    let offset = cursor.position();
    let payload = cursor.read_bytes(length as usize)?;

    Ok(ChunkRecord {
        kind,
        length,
        offset,
        payload,
    })
}
