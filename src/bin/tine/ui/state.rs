//! Shared state types for UI communication
//!
//! Static data is built once before the stream starts; per-callback updates
//! are `Copy` so the audio thread can send them without allocating.

use tine_dsp::synth::VoiceSnapshot;

/// Voices reported per update
pub const MAX_VOICES_SHOWN: usize = 16;

/// Commands sent from UI thread to audio thread
#[derive(Clone, Copy, Debug)]
pub enum ControlMessage {
    /// Pause or resume the phrase
    TogglePlayback,
    /// Restart the phrase from its first beat
    Reset,
}

/// Static state, known before audio starts
#[derive(Clone, Debug)]
pub struct UiStateInit {
    pub bpm: f64,
    /// Phrase length in beats
    pub beats: f64,
    pub sample_rate: f32,
    pub num_voices: usize,
    /// Pitch-bend range in semitones when legacy mode is on
    pub legacy_bend_range: Option<f32>,
}

/// Dynamic state sent once per audio callback
#[derive(Clone, Copy, Debug)]
pub struct VoiceFrame {
    pub voices: [VoiceSnapshot; MAX_VOICES_SHOWN],
    /// Valid entries in `voices`
    pub count: u8,
    /// Voices sounding, including any past `MAX_VOICES_SHOWN`
    pub active: u8,
    /// Position in the phrase, 0.0..1.0
    pub progress: f64,
    pub is_playing: bool,
}

impl Default for VoiceFrame {
    fn default() -> Self {
        Self {
            voices: [VoiceSnapshot::default(); MAX_VOICES_SHOWN],
            count: 0,
            active: 0,
            progress: 0.0,
            is_playing: true,
        }
    }
}

impl VoiceFrame {
    pub fn voices(&self) -> &[VoiceSnapshot] {
        &self.voices[..usize::from(self.count).min(MAX_VOICES_SHOWN)]
    }
}
