/// Channel voice messages as they arrive from a MIDI port.
///
/// Channels are numbered 1..=16, matching how hosts and legacy-mode channel
/// ranges count them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    ChannelPressure { channel: u8, pressure: u8 },
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

impl MidiEvent {
    /// Decode one channel voice message from raw bytes.
    ///
    /// Returns `None` for system messages, running status, and truncated
    /// input. A note-on with velocity 0 decodes as a note-off.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        if status < 0x80 || status >= 0xF0 {
            return None;
        }

        let channel = (status & 0x0F) + 1;
        let data1 = data.first().map(|b| b & 0x7F);
        let data2 = data.get(1).map(|b| b & 0x7F);

        match status & 0xF0 {
            0x80 => Some(MidiEvent::NoteOff {
                channel,
                key: data1?,
                velocity: data2?,
            }),
            0x90 => {
                let (key, velocity) = (data1?, data2?);
                if velocity == 0 {
                    Some(MidiEvent::NoteOff {
                        channel,
                        key,
                        velocity: 0,
                    })
                } else {
                    Some(MidiEvent::NoteOn {
                        channel,
                        key,
                        velocity,
                    })
                }
            }
            0xB0 => Some(MidiEvent::ControlChange {
                channel,
                controller: data1?,
                value: data2?,
            }),
            0xC0 => Some(MidiEvent::ProgramChange {
                channel,
                program: data1?,
            }),
            0xD0 => Some(MidiEvent::ChannelPressure {
                channel,
                pressure: data1?,
            }),
            0xE0 => {
                let raw = (u16::from(data2?) << 7) | u16::from(data1?);
                Some(MidiEvent::PitchBend {
                    channel,
                    value: raw as i16 - 8192,
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_note_on_with_one_based_channel() {
        assert_eq!(
            MidiEvent::from_bytes(&[0x92, 60, 100]),
            Some(MidiEvent::NoteOn {
                channel: 3,
                key: 60,
                velocity: 100
            })
        );
    }

    #[test]
    fn zero_velocity_note_on_is_note_off() {
        assert!(matches!(
            MidiEvent::from_bytes(&[0x90, 64, 0]),
            Some(MidiEvent::NoteOff { key: 64, .. })
        ));
    }

    #[test]
    fn pitch_bend_is_centred() {
        assert_eq!(
            MidiEvent::from_bytes(&[0xE0, 0x00, 0x40]),
            Some(MidiEvent::PitchBend {
                channel: 1,
                value: 0
            })
        );
        assert_eq!(
            MidiEvent::from_bytes(&[0xE0, 0x7F, 0x7F]),
            Some(MidiEvent::PitchBend {
                channel: 1,
                value: 8191
            })
        );
    }

    #[test]
    fn rejects_truncated_and_system_messages() {
        assert_eq!(MidiEvent::from_bytes(&[0x90, 60]), None);
        assert_eq!(MidiEvent::from_bytes(&[0xF8]), None);
        assert_eq!(MidiEvent::from_bytes(&[]), None);
    }
}
