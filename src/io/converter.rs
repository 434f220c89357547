use crate::{io::midi::MidiEvent, synth::message::SynthMessage};

/// Map a decoded MIDI message onto the synth's control vocabulary.
///
/// Controller 123 (All Notes Off) is honoured; other controllers and program
/// changes have no counterpart in the instrument and are dropped.
pub fn midi_to_synth(midi: MidiEvent) -> Option<SynthMessage> {
    match midi {
        MidiEvent::NoteOn {
            channel,
            key,
            velocity,
        } => Some(SynthMessage::NoteOn {
            channel,
            note: key,
            velocity,
        }),
        MidiEvent::NoteOff { channel, key, .. } => Some(SynthMessage::NoteOff { channel, note: key }),
        MidiEvent::ChannelPressure { channel, pressure } => {
            Some(SynthMessage::ChannelPressure { channel, pressure })
        }
        MidiEvent::PitchBend { channel, value } => Some(SynthMessage::PitchBend { channel, value }),
        MidiEvent::ControlChange {
            controller: 123, ..
        } => Some(SynthMessage::AllNotesOff),
        _ => None,
    }
}

pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}
