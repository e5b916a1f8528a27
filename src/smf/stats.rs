//! Per-channel note bookkeeping

/// Number of MIDI channels
pub const MIDI_CHANNELS: usize = 16;

/// Min-pitch sentinel before any note is recorded
const UNSET_MIN_PITCH: u8 = 128;
/// Max-pitch sentinel before any note is recorded
const UNSET_MAX_PITCH: i16 = -1;

/// Program numbers in order of first appearance, without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstrumentSet(Vec<u8>);

impl InstrumentSet {
    /// Insert a program, returning false if it was already present
    pub fn insert(&mut self, program: u8) -> bool {
        if self.0.contains(&program) {
            return false;
        }
        self.0.push(program);
        true
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Note observations for one channel of one track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelStats {
    channel: u8,
    notes: Vec<u8>,
    pitch_sum: u64,
    min_pitch: u8,
    max_pitch: i16,
    instruments: InstrumentSet,
}

impl ChannelStats {
    pub fn new(channel: u8) -> Self {
        Self {
            channel,
            notes: Vec::new(),
            pitch_sum: 0,
            min_pitch: UNSET_MIN_PITCH,
            max_pitch: UNSET_MAX_PITCH,
            instruments: InstrumentSet::default(),
        }
    }

    /// Record a sounded note
    pub fn record_note(&mut self, pitch: u8) {
        // The first note replaces both sentinels
        if self.notes.is_empty() {
            self.min_pitch = pitch;
            self.max_pitch = i16::from(pitch);
        } else {
            self.min_pitch = self.min_pitch.min(pitch);
            self.max_pitch = self.max_pitch.max(i16::from(pitch));
        }
        self.notes.push(pitch);
        self.pitch_sum += u64::from(pitch);
    }

    pub fn record_program(&mut self, program: u8) {
        self.instruments.insert(program);
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Pitches in the order they were played
    pub fn notes(&self) -> &[u8] {
        &self.notes
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn pitch_sum(&self) -> u64 {
        self.pitch_sum
    }

    pub fn min_pitch(&self) -> Option<u8> {
        (!self.notes.is_empty()).then_some(self.min_pitch)
    }

    pub fn max_pitch(&self) -> Option<u8> {
        if self.notes.is_empty() {
            None
        } else {
            u8::try_from(self.max_pitch).ok()
        }
    }

    /// Mean pitch, or `None` with no notes recorded
    pub fn avg_pitch(&self) -> Option<f64> {
        if self.notes.is_empty() {
            None
        } else {
            Some(self.pitch_sum as f64 / self.notes.len() as f64)
        }
    }

    pub fn instruments(&self) -> &InstrumentSet {
        &self.instruments
    }
}

/// Channel statistics for one track, indexed by channel number
#[derive(Debug, Clone, Default)]
pub struct ChannelStatsTable {
    channels: [Option<ChannelStats>; MIDI_CHANNELS],
}

impl ChannelStatsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stats for a channel, created on first use
    fn entry(&mut self, channel: u8) -> &mut ChannelStats {
        let slot = &mut self.channels[usize::from(channel & 0x0F)];
        slot.get_or_insert_with(|| ChannelStats::new(channel & 0x0F))
    }

    /// Record a Note-On; velocity 0 is a note-off and is ignored
    pub fn note_on(&mut self, channel: u8, pitch: u8, velocity: u8) {
        if velocity > 0 {
            self.entry(channel).record_note(pitch);
        }
    }

    pub fn program_change(&mut self, channel: u8, program: u8) {
        self.entry(channel).record_program(program);
    }

    pub fn get(&self, channel: u8) -> Option<&ChannelStats> {
        self.channels.get(usize::from(channel))?.as_ref()
    }

    /// Channels that have seen any activity, in ascending channel order
    pub fn iter(&self) -> impl Iterator<Item = &ChannelStats> {
        self.channels.iter().flatten()
    }
}
