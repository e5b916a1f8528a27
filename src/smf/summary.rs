//! Reported per-track statistics

use super::header::FileHeader;
use super::stats::{ChannelStats, ChannelStatsTable};
use crate::error::DecodeError;
use serde::{Serialize, Serializer};

/// Statistics for one channel that played at least one note
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSummary {
    pub channel: u8,
    pub note_count: usize,
    pub avg_pitch: f64,
    pub min_pitch: u8,
    pub max_pitch: u8,
    /// Program numbers in order of first appearance
    pub instruments: Vec<u8>,
}

impl ChannelSummary {
    /// Summarize a channel, or `None` if it never sounded a note
    pub fn from_stats(stats: &ChannelStats) -> Option<Self> {
        Some(Self {
            channel: stats.channel(),
            note_count: stats.note_count(),
            avg_pitch: stats.avg_pitch()?,
            min_pitch: stats.min_pitch()?,
            max_pitch: stats.max_pitch()?,
            instruments: stats.instruments().as_slice().to_vec(),
        })
    }
}

/// Statistics for one track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackSummary {
    /// Index of the `MTrk` chunk in the file
    pub id: usize,
    /// Sequence/track name meta event, if the track has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Sounding channels in ascending channel order
    pub channels: Vec<ChannelSummary>,
}

impl TrackSummary {
    pub fn build(id: usize, name: Option<String>, stats: &ChannelStatsTable) -> Self {
        let channels = stats.iter().filter_map(ChannelSummary::from_stats).collect();
        Self { id, name, channels }
    }

    /// True if no channel in the track sounded a note
    pub fn is_silent(&self) -> bool {
        self.channels.is_empty()
    }
}

/// A track that was dropped from the result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackFailure {
    /// Index of the `MTrk` chunk in the file
    pub track: usize,
    /// Tick reached before the error
    pub tick: u64,
    #[serde(serialize_with = "serialize_display")]
    pub error: DecodeError,
}

/// Outcome of decoding one file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseResult {
    pub header: FileHeader,
    /// Tracks with at least one sounding channel
    pub tracks: Vec<TrackSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<TrackFailure>,
}

impl ParseResult {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

fn serialize_display<S: Serializer, T: std::fmt::Display>(
    value: &T,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
