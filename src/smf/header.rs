//! SMF header chunk (`MThd`)

use super::cursor::ByteCursor;
use crate::error::DecodeResult;
use serde::Serialize;

/// Top bit of the division word selects SMPTE timing
pub const SMPTE_FLAG: u16 = 0x8000;

/// Parsed `MThd` payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileHeader {
    /// 0 = single track, 1 = simultaneous tracks, 2 = independent sequences
    pub format: u16,
    /// Number of `MTrk` chunks the file declares
    pub track_count: u16,
    /// Raw time division word
    pub division: u16,
}

impl FileHeader {
    /// Ticks per quarter note, if the division is metrical
    pub fn ticks_per_quarter(&self) -> Option<u16> {
        if self.division & SMPTE_FLAG == 0 {
            Some(self.division)
        } else {
            None
        }
    }

    /// SMPTE frames per second and ticks per frame, if the division is timecode based
    pub fn smpte(&self) -> Option<(u8, u8)> {
        if self.division & SMPTE_FLAG == 0 {
            return None;
        }
        let [hi, lo] = self.division.to_be_bytes();
        // Frame rate is stored as a negative two's complement byte
        let fps = (hi as i8).unsigned_abs();
        Some((fps, lo))
    }
}

/// Parse the header fields from an `MThd` payload
///
/// Only the first six bytes are read; anything past them belongs to future
/// revisions of the format and is left to the caller to skip.
pub fn parse_header(payload: &[u8], origin: usize) -> DecodeResult<FileHeader> {
    let mut cursor = ByteCursor::with_origin(payload, origin);
    let format = cursor.read_u16_be()?;
    let track_count = cursor.read_u16_be()?;
    let division = cursor.read_u16_be()?;

    Ok(FileHeader {
        format,
        track_count,
        division,
    })
}
