#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::synth::event::NoteEvent;

/// Control messages sent from a non-realtime thread (MIDI input, UI,
/// sequencer) to the audio thread. MIDI-style integer payloads; converted to
/// [`NoteEvent`]s when the audio callback drains them.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
    /// 14-bit bend centred on zero (-8192..=8191).
    PitchBend { channel: u8, value: i16 },
    ChannelPressure { channel: u8, pressure: u8 },
    AllNotesOff,
}

impl SynthMessage {
    /// Schedule this message at `offset` samples into the next block.
    pub fn to_event(self, offset: usize) -> NoteEvent {
        match self {
            SynthMessage::NoteOn {
                channel,
                note,
                velocity,
            } => NoteEvent::note_on(offset, channel, note, f32::from(velocity) / 127.0),
            SynthMessage::NoteOff { channel, note } => NoteEvent::note_off(offset, channel, note),
            SynthMessage::PitchBend { channel, value } => {
                let bend = if value >= 0 {
                    f32::from(value) / 8191.0
                } else {
                    f32::from(value) / 8192.0
                };
                NoteEvent::pitch_bend(offset, channel, bend)
            }
            SynthMessage::ChannelPressure { channel, pressure } => {
                NoteEvent::pressure(offset, channel, f32::from(pressure) / 127.0)
            }
            SynthMessage::AllNotesOff => NoteEvent::all_notes_off(offset),
        }
    }
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}
