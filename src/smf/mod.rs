//! Standard MIDI File decoding
//!
//! The decoder scans top-level chunks, parses the `MThd` header once and runs a
//! [`TrackParser`] over each `MTrk` chunk. Files in the wild are often sloppy, so
//! scanning is best-effort:
//!
//! - the header's track count bounds the number of chunks read after `MThd`;
//!   unknown chunk types are skipped by their declared length but still use up
//!   one of those slots, and a track's id is the slot it was found in;
//! - a track that fails to decode is dropped and recorded in
//!   [`ParseResult::failures`], and scanning continues with the next chunk;
//! - if the data ends before all declared chunks are read, or a chunk claims
//!   more bytes than remain, the tracks decoded so far are returned.
//!
//! Only a bad header is fatal for the whole file.

pub mod chunk;
pub mod cursor;
pub mod file;
pub mod header;
pub mod stats;
pub mod summary;
pub mod track;
pub mod vlq;

pub use file::read_smf_file;
pub use header::FileHeader;
pub use summary::{ChannelSummary, ParseResult, TrackFailure, TrackSummary};
pub use track::{TrackEvent, TrackParser};

use crate::error::{DecodeError, DecodeResult};
use chunk::{read_chunk, tag};
use cursor::ByteCursor;
use header::parse_header;
use log::{debug, warn};

/// Decoder settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Fail a track on system common/real-time status bytes instead of skipping them
    pub strict: bool,
}

/// SMF decoder
#[derive(Debug, Clone, Default)]
pub struct SmfDecoder {
    options: DecodeOptions,
}

impl SmfDecoder {
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> DecodeOptions {
        self.options
    }

    /// Decode a whole file held in memory
    pub fn decode(&self, data: &[u8]) -> DecodeResult<ParseResult> {
        let mut cursor = ByteCursor::new(data);

        let magic = cursor.read_tag().map_err(|_| DecodeError::InvalidMagic)?;
        if magic != tag::HEADER {
            return Err(DecodeError::InvalidMagic);
        }

        let header_length = cursor.read_u32_be()?;
        let header_offset = cursor.position();
        // Reading the whole declared payload skips any fields added after SMF 1.0
        let header_payload = cursor.read_bytes(header_length as usize)?;
        let header = parse_header(header_payload, header_offset)?;
        debug!(
            "SMF format {}, {} tracks, division {:#06x}",
            header.format, header.track_count, header.division
        );

        let declared = usize::from(header.track_count);
        let mut tracks = Vec::new();
        let mut failures = Vec::new();
        let mut slot = 0;

        while slot < declared && !cursor.is_eof() {
            let id = slot;
            slot += 1;

            let chunk = match read_chunk(&mut cursor) {
                Ok(chunk) => chunk,
                Err(error) => {
                    warn!("Track {}: chunk cut short, stopping scan: {}", id, error);
                    failures.push(TrackFailure {
                        track: id,
                        tick: 0,
                        error,
                    });
                    break;
                }
            };

            if !chunk.is_track() {
                debug!(
                    "Skipping unknown chunk {:?} in slot {} ({} bytes)",
                    chunk.kind_str(),
                    id,
                    chunk.length
                );
                continue;
            }

            match self.decode_track(id, chunk.payload, chunk.offset) {
                Ok(summary) if summary.is_silent() => {
                    debug!("Track {}: no sounding notes", id);
                }
                Ok(summary) => tracks.push(summary),
                Err(failure) => {
                    warn!("Track {} dropped: {}", id, failure.error);
                    failures.push(failure);
                }
            }
        }

        if slot < declared && failures.is_empty() {
            warn!("File ended after {} of {} declared chunks", slot, declared);
        }

        Ok(ParseResult {
            header,
            tracks,
            failures,
        })
    }

    fn decode_track(
        &self,
        id: usize,
        payload: &[u8],
        offset: usize,
    ) -> std::result::Result<TrackSummary, TrackFailure> {
        let mut parser = TrackParser::new(payload, offset, self.options);
        if let Err(error) = parser.run() {
            return Err(TrackFailure {
                track: id,
                tick: parser.absolute_time(),
                error,
            });
        }

        let (stats, name) = parser.into_parts();
        Ok(TrackSummary::build(id, name, &stats))
    }
}

/// Decode with default options
pub fn analyze(data: &[u8]) -> DecodeResult<ParseResult> {
    SmfDecoder::default().decode(data)
}
