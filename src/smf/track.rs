//! Track event stream parser
//!
//! Decodes one `MTrk` payload event by event, carrying the running status
//! between events and feeding note data into a [`ChannelStatsTable`].

use super::cursor::ByteCursor;
use super::stats::ChannelStatsTable;
use super::vlq::decode_vlq;
use super::DecodeOptions;
use crate::error::{DecodeError, DecodeResult};

/// Status bytes and status nibbles
pub mod status {
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
    pub const POLY_PRESSURE: u8 = 0xA0;
    pub const CONTROL_CHANGE: u8 = 0xB0;
    pub const PROGRAM_CHANGE: u8 = 0xC0;
    pub const CHANNEL_PRESSURE: u8 = 0xD0;
    pub const PITCH_BEND: u8 = 0xE0;
    pub const SYSEX: u8 = 0xF0;
    pub const SYSEX_ESCAPE: u8 = 0xF7;
    pub const META: u8 = 0xFF;
}

/// Meta event types the parser looks at
pub mod meta {
    pub const TRACK_NAME: u8 = 0x03;
}

/// A decoded track event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackEvent {
    NoteOff { channel: u8, key: u8, velocity: u8 },
    NoteOn { channel: u8, key: u8, velocity: u8 },
    PolyPressure { channel: u8, key: u8, pressure: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
    ChannelPressure { channel: u8, pressure: u8 },
    /// 14-bit bend value, 0x2000 is centre
    PitchBend { channel: u8, value: u16 },
    Meta { kind: u8, length: u32 },
    SysEx { status: u8, length: u32 },
    /// System common or real-time status carried no data
    System { status: u8 },
}

/// Decoder state for one track
#[derive(Debug, Clone)]
pub struct TrackParser<'a> {
    cursor: ByteCursor<'a>,
    running_status: Option<u8>,
    absolute_time: u64,
    stats: ChannelStatsTable,
    name: Option<String>,
    options: DecodeOptions,
}

impl<'a> TrackParser<'a> {
    /// Create a parser over a track payload starting at file offset `origin`
    pub fn new(payload: &'a [u8], origin: usize, options: DecodeOptions) -> Self {
        Self {
            cursor: ByteCursor::with_origin(payload, origin),
            running_status: None,
            absolute_time: 0,
            stats: ChannelStatsTable::new(),
            name: None,
            options,
        }
    }

    /// Last explicit status byte, if any
    pub fn running_status(&self) -> Option<u8> {
        self.running_status
    }

    /// Ticks elapsed since the start of the track
    pub fn absolute_time(&self) -> u64 {
        self.absolute_time
    }

    /// Absolute file offset of the next event
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    pub fn stats(&self) -> &ChannelStatsTable {
        &self.stats
    }

    /// First track name meta event seen so far
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Decode every remaining event
    pub fn run(&mut self) -> DecodeResult<()> {
        while self.next_event()?.is_some() {}
        Ok(())
    }

    /// Consume the parser, keeping the collected statistics and name
    pub fn into_parts(self) -> (ChannelStatsTable, Option<String>) {
        (self.stats, self.name)
    }

    /// Decode one event; `Ok(None)` once the payload ends on an event boundary
    pub fn next_event(&mut self) -> DecodeResult<Option<TrackEvent>> {
        if self.cursor.is_eof() {
            return Ok(None);
        }

        let delta = decode_vlq(&mut self.cursor)?;
        self.absolute_time += u64::from(delta);

        let position = self.cursor.position();
        let lead = self.cursor.peek_u8()?;
        let status_byte = if lead & 0x80 != 0 {
            // Any explicit status, meta and sysex included, replaces the running status
            self.cursor.read_u8()?;
            self.running_status = Some(lead);
            lead
        } else {
            // Data byte: reuse the previous status, leave the byte for the payload
            self.running_status.ok_or(DecodeError::NoRunningStatus {
                position,
                byte: lead,
            })?
        };

        let event = if status_byte < status::SYSEX {
            self.channel_event(status_byte)?
        } else {
            match status_byte {
                status::META => self.meta_event()?,
                status::SYSEX | status::SYSEX_ESCAPE => {
                    let length = decode_vlq(&mut self.cursor)?;
                    self.cursor.skip(length as usize)?;
                    TrackEvent::SysEx {
                        status: status_byte,
                        length,
                    }
                }
                _ => {
                    if self.options.strict {
                        return Err(DecodeError::UnsupportedRealtimeEvent {
                            position,
                            status: status_byte,
                        });
                    }
                    TrackEvent::System {
                        status: status_byte,
                    }
                }
            }
        };

        Ok(Some(event))
    }

    fn channel_event(&mut self, status_byte: u8) -> DecodeResult<TrackEvent> {
        let channel = status_byte & 0x0F;

        let event = match status_byte & 0xF0 {
            status::NOTE_OFF => {
                let [key, velocity] = self.data_pair()?;
                TrackEvent::NoteOff {
                    channel,
                    key,
                    velocity,
                }
            }
            status::NOTE_ON => {
                let [key, velocity] = self.data_pair()?;
                self.stats.note_on(channel, key, velocity);
                TrackEvent::NoteOn {
                    channel,
                    key,
                    velocity,
                }
            }
            status::POLY_PRESSURE => {
                let [key, pressure] = self.data_pair()?;
                TrackEvent::PolyPressure {
                    channel,
                    key,
                    pressure,
                }
            }
            status::CONTROL_CHANGE => {
                let [controller, value] = self.data_pair()?;
                TrackEvent::ControlChange {
                    channel,
                    controller,
                    value,
                }
            }
            status::PROGRAM_CHANGE => {
                let program = self.data_byte()?;
                self.stats.program_change(channel, program);
                TrackEvent::ProgramChange { channel, program }
            }
            status::CHANNEL_PRESSURE => {
                let pressure = self.data_byte()?;
                TrackEvent::ChannelPressure { channel, pressure }
            }
            // Only 0xE0 is left below 0xF0
            _ => {
                let [lsb, msb] = self.data_pair()?;
                let value = (u16::from(msb) << 7) | u16::from(lsb);
                TrackEvent::PitchBend { channel, value }
            }
        };

        Ok(event)
    }

    fn meta_event(&mut self) -> DecodeResult<TrackEvent> {
        let kind = self.cursor.read_u8()?;
        let length = decode_vlq(&mut self.cursor)?;
        let payload = self.cursor.read_bytes(length as usize)?;

        if kind == meta::TRACK_NAME && self.name.is_none() {
            self.name = Some(String::from_utf8_lossy(payload).into_owned());
        }

        Ok(TrackEvent::Meta { kind, length })
    }

    /// Read one channel message data byte; bit 7 must be clear
    fn data_byte(&mut self) -> DecodeResult<u8> {
        let position = self.cursor.position();
        let byte = self.cursor.read_u8()?;
        if byte & 0x80 != 0 {
            return Err(DecodeError::InvalidDataByte { position, byte });
        }
        Ok(byte)
    }

    fn data_pair(&mut self) -> DecodeResult<[u8; 2]> {
        let first = self.data_byte()?;
        let second = self.data_byte()?;
        Ok([first, second])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser(data: &[u8]) -> TrackParser<'_> {
        TrackParser::new(data, 0, DecodeOptions::default())
    }

    #[test]
    fn test_note_on_records_pitch() {
        let data = [0x00, 0x90, 0x3C, 0x64, 0x0A, 0x80, 0x3C, 0x00];
        let mut p = parser(&data);
        assert_eq!(
            p.next_event().unwrap(),
            Some(TrackEvent::NoteOn {
                channel: 0,
                key: 60,
                velocity: 100
            })
        );
        assert_eq!(p.running_status(), Some(0x90));
        assert_eq!(
            p.next_event().unwrap(),
            Some(TrackEvent::NoteOff {
                channel: 0,
                key: 60,
                velocity: 0
            })
        );
        assert_eq!(p.running_status(), Some(0x80));
        assert_eq!(p.absolute_time(), 10);
        assert_eq!(p.next_event().unwrap(), None);
        assert_eq!(p.stats().get(0).unwrap().notes(), &[60]);
    }

    #[test]
    fn test_running_status_reuses_note_on() {
        // Second event has no status byte: 0x40 is the key of another Note-On on ch 3
        let data = [0x00, 0x93, 0x3C, 0x50, 0x00, 0x40, 0x50, 0x00, 0x43, 0x00];
        let mut p = parser(&data);
        p.next_event().unwrap();
        assert_eq!(
            p.next_event().unwrap(),
            Some(TrackEvent::NoteOn {
                channel: 3,
                key: 0x40,
                velocity: 0x50
            })
        );
        assert_eq!(
            p.next_event().unwrap(),
            Some(TrackEvent::NoteOn {
                channel: 3,
                key: 0x43,
                velocity: 0
            })
        );
        assert_eq!(p.running_status(), Some(0x93));
        assert_eq!(p.stats().get(3).unwrap().notes(), &[0x3C, 0x40]);
    }

    #[test]
    fn test_data_byte_without_running_status() {
        let data = [0x00, 0x3C, 0x64];
        let mut p = TrackParser::new(&data, 22, DecodeOptions::default());
        assert_eq!(
            p.next_event().unwrap_err(),
            DecodeError::NoRunningStatus {
                position: 23,
                byte: 0x3C
            }
        );
    }

    #[test]
    fn test_sysex_is_skipped_by_length() {
        // The sysex payload contains bytes that look like a Note-On
        let data = [
            0x00, 0xF0, 0x05, 0x90, 0x3C, 0x64, 0x00, 0xF7, // sysex
            0x00, 0x91, 0x30, 0x40, // real note
        ];
        let mut p = parser(&data);
        assert_eq!(
            p.next_event().unwrap(),
            Some(TrackEvent::SysEx {
                status: 0xF0,
                length: 5
            })
        );
        p.run().unwrap();
        assert!(p.stats().get(0).is_none());
        assert_eq!(p.stats().get(1).unwrap().notes(), &[0x30]);
    }

    #[test]
    fn test_meta_replaces_running_status() {
        let data = [
            0x00, 0x90, 0x3C, 0x64, // note on
            0x00, 0xFF, 0x01, 0x02, b'h', b'i', // text meta
            0x00, 0x3E, 0x64, // data bytes now continue the meta status
        ];
        let mut p = parser(&data);
        p.next_event().unwrap();
        p.next_event().unwrap();
        assert_eq!(p.running_status(), Some(0xFF));
        assert_eq!(p.position(), 10);

        // 0x3E is read as a meta type with a 100-byte payload that is not there
        let err = p.next_event().unwrap_err();
        assert!(err.is_truncated());
        assert_eq!(p.stats().get(0).unwrap().notes(), &[0x3C]);
    }

    #[test]
    fn test_sysex_sets_running_status() {
        let data = [0x00, 0xF0, 0x01, 0xF7];
        let mut p = parser(&data);
        p.run().unwrap();
        assert_eq!(p.running_status(), Some(0xF0));
    }

    #[test]
    fn test_data_byte_with_high_bit_is_rejected() {
        let data = [0x00, 0x90, 0xC8, 0x64];
        let mut p = TrackParser::new(&data, 22, DecodeOptions::default());
        assert_eq!(
            p.next_event().unwrap_err(),
            DecodeError::InvalidDataByte {
                position: 24,
                byte: 0xC8
            }
        );
        assert!(p.stats().get(0).is_none());

        let data = [0x00, 0xC1, 0x80];
        let mut p = parser(&data);
        assert!(matches!(
            p.next_event().unwrap_err(),
            DecodeError::InvalidDataByte { byte: 0x80, .. }
        ));
    }

    #[test]
    fn test_track_name_is_captured() {
        let data = [
            0x00, 0xFF, 0x03, 0x04, b'L', b'e', b'a', b'd', //
            0x00, 0xFF, 0x03, 0x01, b'X', //
            0x00, 0xFF, 0x2F, 0x00,
        ];
        let mut p = parser(&data);
        p.run().unwrap();
        assert_eq!(p.name(), Some("Lead"));
    }

    #[test]
    fn test_program_change_and_other_channel_messages() {
        let data = [
            0x00, 0xC2, 0x28, // program 40
            0x00, 0xB2, 0x07, 0x64, // volume
            0x00, 0xD2, 0x10, // channel pressure
            0x00, 0xA2, 0x3C, 0x10, // poly pressure
            0x00, 0xE2, 0x00, 0x40, // pitch bend centre
            0x00, 0xC2, 0x28, // same program again
        ];
        let mut p = parser(&data);
        let mut events = Vec::new();
        while let Some(event) = p.next_event().unwrap() {
            events.push(event);
        }
        assert_eq!(events.len(), 6);
        assert_eq!(
            events[4],
            TrackEvent::PitchBend {
                channel: 2,
                value: 0x2000
            }
        );
        let stats = p.stats().get(2).unwrap();
        assert_eq!(stats.instruments().as_slice(), &[40]);
        assert_eq!(stats.note_count(), 0);
    }

    #[test]
    fn test_system_event_is_noop_by_default() {
        let data = [0x00, 0xF8, 0x00, 0x90, 0x3C, 0x64];
        let mut p = parser(&data);
        assert_eq!(
            p.next_event().unwrap(),
            Some(TrackEvent::System { status: 0xF8 })
        );
        p.run().unwrap();
        assert_eq!(p.stats().get(0).unwrap().note_count(), 1);
    }

    #[test]
    fn test_system_event_fails_in_strict_mode() {
        let data = [0x00, 0xF8, 0x00, 0x90, 0x3C, 0x64];
        let mut p = TrackParser::new(&data, 0, DecodeOptions { strict: true });
        assert_eq!(
            p.next_event().unwrap_err(),
            DecodeError::UnsupportedRealtimeEvent {
                position: 1,
                status: 0xF8
            }
        );
    }

    #[test]
    fn test_event_cut_short_is_truncated() {
        let data = [0x00, 0x90, 0x3C];
        let mut p = parser(&data);
        assert!(p.next_event().unwrap_err().is_truncated());

        // Delta time with nothing after it
        let data = [0x00, 0x90, 0x3C, 0x64, 0x05];
        let mut p = parser(&data);
        assert!(p.run().unwrap_err().is_truncated());
        assert_eq!(p.absolute_time(), 5);
    }

    #[test]
    fn test_meta_length_past_end() {
        let data = [0x00, 0xFF, 0x01, 0x10, b'a'];
        let mut p = parser(&data);
        assert!(p.next_event().unwrap_err().is_truncated());
    }
}
