use std::io;

/// Errors produced while decoding SMF data
///
/// Offsets are absolute positions in the decoded buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Not a valid MIDI file: missing \"MThd\" header")]
    InvalidMagic,

    #[error("Unexpected end of data at offset {position}: needed {needed} bytes, {remaining} left")]
    Truncated {
        position: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("Malformed variable-length quantity at offset {position}")]
    MalformedVlq { position: usize },

    #[error("Data byte {byte:#04x} at offset {position} without a running status")]
    NoRunningStatus { position: usize, byte: u8 },

    #[error("Data byte {byte:#04x} at offset {position} has its high bit set")]
    InvalidDataByte { position: usize, byte: u8 },

    #[error("Unsupported system event {status:#04x} at offset {position}")]
    UnsupportedRealtimeEvent { position: usize, status: u8 },
}

impl DecodeError {
    /// True if the data ended before a read could complete
    pub fn is_truncated(&self) -> bool {
        matches!(self, DecodeError::Truncated { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("SMF decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Result of a decode step
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;
