use crate::{dsp::EnvelopeState, params::TineParams, synth::tine::Tine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Active,    // Key held, tine ringing
    Releasing, // Key released, damper applied
}

/// When a voice was started.
///
/// Ordered by the global sample clock first, then by the order note-ons were
/// processed, so two notes landing on the same sample still compare as
/// older/newer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct VoiceAge {
    pub sample: u64,
    pub serial: u64,
}

/// Read-only view of a voice for diagnostics and visualisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceSnapshot {
    pub slot: usize,
    pub note: Option<u8>,
    pub channel: u8,
    pub stage: EnvelopeState,
    pub level: f32,
}

impl Default for VoiceSnapshot {
    fn default() -> Self {
        Self {
            slot: 0,
            note: None,
            channel: 0,
            stage: EnvelopeState::Idle,
            level: 0.0,
        }
    }
}

/// One slot of the voice pool: a tine plus the note it is bound to.
pub struct Voice {
    slot: usize,
    note: Option<u8>,
    channel: u8,
    state: VoiceState,
    age: VoiceAge,
    tine: Tine,
}

impl Voice {
    pub fn new(slot: usize) -> Self {
        Self {
            slot,
            note: None,
            channel: 0,
            state: VoiceState::Free,
            age: VoiceAge::default(),
            tine: Tine::new(),
        }
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        self.tine.prepare(sample_rate);
        self.free();
    }

    pub fn set_params(&mut self, params: &TineParams) {
        self.tine.set_params(params);
    }

    /// Bind to a note and strike.
    ///
    /// The tine re-strikes in place when it is still ringing the same note,
    /// and drops a different ringing note before striking.
    pub fn start(&mut self, note: u8, velocity: f32, channel: u8, age: VoiceAge) {
        self.note = Some(note.min(127));
        self.channel = channel;
        self.state = VoiceState::Active;
        self.age = age;

        self.tine.start(note, velocity);
    }

    /// Key released: let the damper fade the tine out.
    pub fn release(&mut self) {
        if self.state == VoiceState::Active {
            self.state = VoiceState::Releasing;
            self.tine.stop(true);
        }
    }

    /// Stop the voice. Without tail-off the slot is free immediately.
    pub fn stop(&mut self, allow_tail_off: bool) {
        if allow_tail_off {
            self.release();
        } else {
            self.tine.stop(false);
            self.free();
        }
    }

    pub fn set_pitch_bend(&mut self, semitones: f32) {
        self.tine.set_pitch_bend(semitones);
    }

    pub fn set_pressure(&mut self, pressure: f32) {
        self.tine.set_pressure(pressure);
    }

    /// Accumulate `num_samples` into `out[start..]`, freeing the slot once
    /// the tine has gone quiet.
    pub fn render(&mut self, out: &mut [f32], start: usize, num_samples: usize) {
        if self.is_free() {
            return;
        }

        self.tine.render_block(out, start, num_samples);

        if !self.tine.is_sounding() {
            self.free();
        }
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, VoiceState::Active | VoiceState::Releasing)
    }

    /// True while the key that started this voice is still down.
    pub fn is_key_down(&self) -> bool {
        self.state == VoiceState::Active
    }

    pub fn is_bound_to(&self, note: u8, channel: u8) -> bool {
        self.is_active() && self.note == Some(note) && self.channel == channel
    }

    pub fn free(&mut self) {
        self.state = VoiceState::Free;
        self.note = None;
    }

    pub fn snapshot(&self) -> VoiceSnapshot {
        VoiceSnapshot {
            slot: self.slot,
            note: self.note,
            channel: self.channel,
            stage: self.tine.stage(),
            level: self.tine.level(),
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn note(&self) -> Option<u8> {
        self.note
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn age(&self) -> VoiceAge {
        self.age
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn tine(&self) -> &Tine {
        &self.tine
    }
}
