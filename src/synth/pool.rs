//! Fixed-size voice pool and stealing policy.
//!
//! Voices live in one `Vec` sized at construction and are never added or
//! removed afterwards; "freeing" a voice returns its slot to `Free`.
//!
//! Allocation order for a note-on:
//!
//! 1. Legacy mode: a voice already bound to the same (note, channel) is
//!    re-struck in place, so a pair is never bound to two voices.
//! 2. The lowest-indexed free voice.
//! 3. With stealing enabled, the voice with the oldest activation age. It is
//!    hard-stopped and restarted within the same sample.
//!
//! Every decision depends only on the event sequence and voice ages, so a
//! given input always produces the same allocation.

use crate::{
    config::LegacyMode,
    params::TineParams,
    synth::voice::{Voice, VoiceAge, VoiceSnapshot},
};

/// Channel state is indexed by 1-based MIDI channel.
const CHANNEL_SLOTS: usize = 17;

/// How a note-on was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocation {
    /// A free voice took the note.
    Fresh { slot: usize },
    /// Legacy mode re-struck the voice already bound to the same note.
    Retriggered { slot: usize },
    /// The oldest voice was cut and reassigned.
    Stolen { slot: usize, previous_note: Option<u8> },
}

impl Allocation {
    pub fn slot(&self) -> usize {
        match *self {
            Allocation::Fresh { slot }
            | Allocation::Retriggered { slot }
            | Allocation::Stolen { slot, .. } => slot,
        }
    }
}

#[inline]
fn clamp_channel(channel: u8) -> u8 {
    channel.clamp(1, 16)
}

#[inline]
fn clamp_velocity(velocity: f32) -> f32 {
    if velocity.is_nan() {
        0.0
    } else {
        velocity.clamp(0.0, 1.0)
    }
}

pub struct VoicePool {
    voices: Vec<Voice>,
    voice_stealing: bool,
    legacy_mode: Option<LegacyMode>,
    params: TineParams,

    // Global sample clock at the start of the current block; never reset
    clock: u64,
    // Note-on counter used to order voices started on the same sample
    serial: u64,

    channel_bend: [f32; CHANNEL_SLOTS],
    channel_pressure: [f32; CHANNEL_SLOTS],
}

impl VoicePool {
    pub fn new(num_voices: usize, voice_stealing: bool, legacy_mode: Option<LegacyMode>) -> Self {
        let voices = (0..num_voices).map(Voice::new).collect();

        Self {
            voices,
            voice_stealing,
            legacy_mode,
            params: TineParams::default(),
            clock: 0,
            serial: 0,
            channel_bend: [0.0; CHANNEL_SLOTS],
            channel_pressure: [0.0; CHANNEL_SLOTS],
        }
    }

    /// Prepare every voice for `sample_rate`. All voices fall silent; the
    /// sample clock keeps running.
    pub fn prepare(&mut self, sample_rate: f64) {
        for voice in &mut self.voices {
            voice.prepare(sample_rate);
            voice.set_params(&self.params);
        }
        self.channel_bend = [0.0; CHANNEL_SLOTS];
        self.channel_pressure = [0.0; CHANNEL_SLOTS];
    }

    pub fn set_params(&mut self, params: TineParams) {
        if params == self.params {
            return;
        }
        self.params = params;
        for voice in &mut self.voices {
            voice.set_params(&params);
        }
    }

    /// Serve a note-on `sample_offset` samples into the current block.
    ///
    /// Returns `None` only when the note is filtered out (legacy channel
    /// range) or the pool is full with stealing disabled.
    pub fn note_on(
        &mut self,
        note: u8,
        velocity: f32,
        channel: u8,
        sample_offset: usize,
    ) -> Option<Allocation> {
        let note = note.min(127);
        let velocity = clamp_velocity(velocity);
        let channel = clamp_channel(channel);

        if let Some(legacy) = &self.legacy_mode {
            if !legacy.accepts(channel) {
                return None;
            }
        }

        self.serial += 1;
        let age = VoiceAge {
            sample: self.clock + sample_offset as u64,
            serial: self.serial,
        };

        let allocation = if let Some(slot) = self.find_retrigger(note, channel) {
            Allocation::Retriggered { slot }
        } else if let Some(slot) = self.voices.iter().position(Voice::is_free) {
            Allocation::Fresh { slot }
        } else if self.voice_stealing {
            let slot = self.find_oldest()?;
            let previous_note = self.voices[slot].note();
            self.voices[slot].stop(false);
            Allocation::Stolen {
                slot,
                previous_note,
            }
        } else {
            return None;
        };

        let bend = self.bend_semitones(channel);
        let pressure = self.channel_pressure[usize::from(channel)];
        let voice = &mut self.voices[allocation.slot()];
        voice.start(note, velocity, channel, age);
        voice.set_pitch_bend(bend);
        voice.set_pressure(pressure);

        Some(allocation)
    }

    /// Release the voice holding (note, channel). Redundant note-offs are
    /// ignored. Returns the released slot.
    pub fn note_off(&mut self, note: u8, channel: u8) -> Option<usize> {
        let note = note.min(127);
        let channel = clamp_channel(channel);

        let slot = self
            .voices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_key_down() && v.is_bound_to(note, channel))
            .min_by_key(|(_, v)| v.age())
            .map(|(slot, _)| slot)?;

        self.voices[slot].stop(true);
        Some(slot)
    }

    /// Set the bend position (-1..=1) for a channel and retune its voices.
    /// Only meaningful in legacy mode; without it bends are ignored.
    pub fn pitch_bend(&mut self, channel: u8, bend: f32) {
        let channel = clamp_channel(channel);
        let Some(legacy) = &self.legacy_mode else {
            return;
        };
        if !legacy.accepts(channel) {
            return;
        }

        self.channel_bend[usize::from(channel)] = if bend.is_nan() {
            0.0
        } else {
            bend.clamp(-1.0, 1.0)
        };

        let semitones = self.bend_semitones(channel);
        for voice in self.voices.iter_mut().filter(|v| v.is_active() && v.channel() == channel) {
            voice.set_pitch_bend(semitones);
        }
    }

    pub fn pressure(&mut self, channel: u8, pressure: f32) {
        let channel = clamp_channel(channel);
        if let Some(legacy) = &self.legacy_mode {
            if !legacy.accepts(channel) {
                return;
            }
        }

        let pressure = if pressure.is_nan() {
            0.0
        } else {
            pressure.clamp(0.0, 1.0)
        };
        self.channel_pressure[usize::from(channel)] = pressure;

        for voice in self.voices.iter_mut().filter(|v| v.is_active() && v.channel() == channel) {
            voice.set_pressure(pressure);
        }
    }

    /// Release every sounding voice with tail-off.
    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            voice.stop(true);
        }
    }

    /// Sum every active voice into `out[start..start + num_samples]`.
    pub fn render(&mut self, out: &mut [f32], start: usize, num_samples: usize) {
        for voice in &mut self.voices {
            voice.render(out, start, num_samples);
        }
    }

    /// Move the sample clock past a rendered block.
    pub fn advance(&mut self, frames: usize) {
        self.clock = self.clock.wrapping_add(frames as u64);
    }

    fn find_retrigger(&self, note: u8, channel: u8) -> Option<usize> {
        self.legacy_mode.as_ref()?;
        self.voices.iter().position(|v| v.is_bound_to(note, channel))
    }

    fn find_oldest(&self) -> Option<usize> {
        // min_by_key keeps the first of equal keys: lowest slot wins ties
        self.voices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_active())
            .min_by_key(|(_, v)| v.age())
            .map(|(slot, _)| slot)
    }

    fn bend_semitones(&self, channel: u8) -> f32 {
        let range = self
            .legacy_mode
            .as_ref()
            .map_or(0.0, |legacy| legacy.pitch_bend_range);
        self.channel_bend[usize::from(channel)] * range
    }

    pub fn num_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn voice(&self, index: usize) -> Option<&Voice> {
        self.voices.get(index)
    }

    pub fn voices(&self) -> impl Iterator<Item = &Voice> {
        self.voices.iter()
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Fill `out` with snapshots of the first `out.len()` voices.
    pub fn collect_snapshots(&self, out: &mut [VoiceSnapshot]) -> usize {
        let mut written = 0;
        for (slot, voice) in out.iter_mut().zip(self.voices.iter()) {
            *slot = voice.snapshot();
            written += 1;
        }
        written
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn voice_stealing(&self) -> bool {
        self.voice_stealing
    }

    pub fn legacy_mode(&self) -> Option<&LegacyMode> {
        self.legacy_mode.as_ref()
    }

    pub fn params(&self) -> TineParams {
        self.params
    }
}
