//! Tine - physical model of a struck electric piano tine.
//!
//! # Signal Path
//!
//! ```text
//!   hammer ─→ [mode 1] ─┐
//!          ─→ [mode 2] ─┼─→ × envelope ─→ pickup ─→ DC block ─→ tone LPF ─→ × gain
//!          ─→ [mode 3] ─┘   (hammer/damper)
//! ```
//!
//! 1. The hammer strikes three damped resonators tuned to the first three
//!    bending modes of a clamped bar (1 : 6.27 : 17.55). Harder strikes put
//!    relatively more energy into the upper modes, which is what makes a
//!    loud tine piano "bell".
//! 2. Each mode rings down on its own; lower notes ring longer.
//! 3. The envelope adds the hammer contact ramp and the felt damper on
//!    release.
//! 4. The asymmetric pickup turns displacement into voltage.
//! 5. A DC blocker removes the offset the pickup asymmetry introduces and a
//!    velocity-tracking low-pass darkens soft notes.
//!
//! Everything is allocation-free and deterministic: identical note, velocity
//! and parameters produce identical samples.

use crate::{
    dsp::{
        envelope::{Envelope, EnvelopeState, SILENCE},
        filter::SVFilter,
        pickup::Pickup,
        resonator::Resonator,
    },
    io::converter::midi_note_to_freq,
    params::TineParams,
};

/// Shape of one vibrating mode relative to the fundamental.
struct ModeShape {
    /// Frequency multiple of the fundamental.
    ratio: f32,
    /// Strike level at full velocity.
    level: f32,
    /// Decay time as a fraction of the fundamental's.
    decay: f32,
    /// Velocity exponent: higher values make the mode appear only on hard hits.
    brightness: f32,
}

const MODES: [ModeShape; 3] = [
    ModeShape {
        ratio: 1.0,
        level: 1.0,
        decay: 1.0,
        brightness: 0.0,
    },
    ModeShape {
        ratio: 6.267,
        level: 0.22,
        decay: 0.18,
        brightness: 1.0,
    },
    ModeShape {
        ratio: 17.55,
        level: 0.08,
        decay: 0.06,
        brightness: 2.0,
    },
];

const MODE_COUNT: usize = MODES.len();

const HAMMER_TIME: f32 = 0.0015;
const DAMPER_TIME: f32 = 0.25;

const PICKUP_DRIVE: f32 = 2.0;
const PICKUP_OFFSET: f32 = 0.3;

const DC_BLOCK_HZ: f32 = 20.0;
const TONE_MIN_HZ: f32 = 1_200.0;
const TONE_VELOCITY_HZ: f32 = 7_000.0;

/// Gain smoothing time constant for amplitude automation.
const GAIN_SMOOTHING_TIME: f32 = 0.01;

/// How much full channel pressure lifts the output.
const PRESSURE_DEPTH: f32 = 0.5;

/// Natural ring time (seconds to -60 dB) of a note's fundamental.
///
/// A1 rings for about 9 s, halving every two octaves.
pub fn ring_time(note: u8) -> f32 {
    (9.0 * 0.5f32.powf((f32::from(note) - 33.0) / 24.0)).clamp(0.6, 9.0)
}

pub struct Tine {
    sample_rate: f32,
    prepared: bool,

    note: u8,
    velocity: f32,
    bend_semitones: f32,
    pressure: f32,

    modes: [Resonator; MODE_COUNT],
    envelope: Envelope,
    pickup: Pickup,
    dc_block: SVFilter,
    tone: SVFilter,

    // Strike scale is sampled at note-on; gain follows the amplitude
    // parameter continuously.
    strike_scale: f32,
    gain: f32,
    target_gain: f32,
    gain_coeff: f32,
}

impl Tine {
    pub fn new() -> Self {
        let params = TineParams::default();
        Self {
            sample_rate: 0.0,
            prepared: false,
            note: 0,
            velocity: 0.0,
            bend_semitones: 0.0,
            pressure: 0.0,
            modes: [Resonator::new(); MODE_COUNT],
            envelope: Envelope::new(HAMMER_TIME, DAMPER_TIME),
            pickup: Pickup::new(PICKUP_DRIVE, PICKUP_OFFSET),
            dc_block: SVFilter::highpass(DC_BLOCK_HZ),
            tone: SVFilter::lowpass(TONE_MIN_HZ + TONE_VELOCITY_HZ),
            strike_scale: params.strike_scale(),
            gain: params.pickup_gain(),
            target_gain: params.pickup_gain(),
            gain_coeff: 1.0,
        }
    }

    /// Derive rates and coefficients for `sample_rate` and fall silent.
    pub fn prepare(&mut self, sample_rate: f64) {
        debug_assert!(sample_rate.is_finite() && sample_rate > 0.0);
        self.sample_rate = (sample_rate as f32).max(1.0);
        self.envelope.prepare(self.sample_rate);
        self.dc_block.prepare(self.sample_rate);
        self.tone.prepare(self.sample_rate);
        self.gain_coeff = 1.0 - (-1.0 / (GAIN_SMOOTHING_TIME * self.sample_rate)).exp();
        self.prepared = true;
        self.silence();
    }

    /// Update the parameter pair. Velocity applies from the next strike,
    /// amplitude glides in over a few milliseconds.
    pub fn set_params(&mut self, params: &TineParams) {
        self.strike_scale = params.strike_scale();
        self.target_gain = params.pickup_gain();
        if !self.is_sounding() {
            self.gain = self.target_gain;
        }
    }

    /// Strike the tine. `velocity` is normalised 0..=1; out-of-range values
    /// are clamped and NaN counts as zero.
    pub fn start(&mut self, note: u8, velocity: f32) {
        debug_assert!(self.prepared, "Tine::start called before prepare");

        let note = note.min(127);
        let velocity = if velocity.is_nan() {
            0.0
        } else {
            velocity.clamp(0.0, 1.0)
        };

        if self.is_sounding() && note != self.note {
            self.silence();
        }

        self.note = note;
        self.velocity = velocity;
        self.retune();

        let strike = self.strike_scale * velocity;
        for (mode, shape) in self.modes.iter_mut().zip(MODES.iter()) {
            mode.strike(strike * shape.level * velocity.powf(shape.brightness));
        }

        self.tone.set_cutoff(TONE_MIN_HZ + TONE_VELOCITY_HZ * velocity);
        self.envelope.note_on();
    }

    /// Release the key. With `allow_tail_off` the damper fades the tine out;
    /// without it the voice is silenced on the spot.
    pub fn stop(&mut self, allow_tail_off: bool) {
        if allow_tail_off {
            self.envelope.note_off();
        } else {
            self.silence();
        }
    }

    /// Bend in semitones. Takes effect on the next sample without
    /// disturbing the ringing modes.
    pub fn set_pitch_bend(&mut self, semitones: f32) {
        let semitones = if semitones.is_finite() { semitones } else { 0.0 };
        if semitones != self.bend_semitones {
            self.bend_semitones = semitones;
            if self.prepared {
                self.retune();
            }
        }
    }

    pub fn set_pressure(&mut self, pressure: f32) {
        self.pressure = if pressure.is_nan() {
            0.0
        } else {
            pressure.clamp(0.0, 1.0)
        };
    }

    fn retune(&mut self) {
        let fundamental = midi_note_to_freq(self.note) * 2.0f32.powf(self.bend_semitones / 12.0);
        let t60 = ring_time(self.note);
        for (mode, shape) in self.modes.iter_mut().zip(MODES.iter()) {
            mode.tune(fundamental * shape.ratio, t60 * shape.decay, self.sample_rate);
        }
    }

    /// Advance by one sample.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if !self.is_sounding() {
            return 0.0;
        }

        let level = self.envelope.next_sample();

        let mut displacement = 0.0;
        let mut energy = 0.0;
        for mode in self.modes.iter_mut() {
            displacement += mode.next_sample();
            energy += mode.energy();
        }

        let voltage = self.pickup.process(displacement * level);
        let shaped = self.tone.next_sample(self.dc_block.next_sample(voltage));

        self.gain += (self.target_gain - self.gain) * self.gain_coeff;
        let out = shaped * self.gain * (1.0 + PRESSURE_DEPTH * self.pressure);

        // Idle once the damper has finished or the tine has rung out
        let rung_out = !matches!(self.envelope.state(), EnvelopeState::Attack)
            && energy * f64::from(level * level) < f64::from(SILENCE * SILENCE);
        if !self.envelope.is_active() || rung_out {
            self.silence();
        }

        out
    }

    /// Add `num_samples` of output into `out[start_sample..]`.
    ///
    /// Accumulates rather than overwrites so the pool can sum voices into a
    /// shared buffer. The range is clipped to the buffer length.
    pub fn render_block(&mut self, out: &mut [f32], start_sample: usize, num_samples: usize) {
        debug_assert!(self.prepared, "Tine::render_block called before prepare");

        let end = start_sample.saturating_add(num_samples).min(out.len());
        let Some(segment) = out.get_mut(start_sample..end) else {
            return;
        };

        for sample in segment.iter_mut() {
            if !self.is_sounding() {
                break;
            }
            *sample += self.next_sample();
        }
    }

    /// Return every piece of continuous state to rest.
    fn silence(&mut self) {
        for mode in self.modes.iter_mut() {
            mode.reset();
        }
        self.envelope.reset();
        self.dc_block.reset();
        self.tone.reset();
        self.gain = self.target_gain;
        self.bend_semitones = 0.0;
        self.pressure = 0.0;
    }

    /// True while the tine produces output.
    pub fn is_sounding(&self) -> bool {
        self.envelope.is_active()
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn stage(&self) -> EnvelopeState {
        self.envelope.state()
    }

    /// Current envelope level (0.0-1.0), for visualisation.
    pub fn level(&self) -> f32 {
        self.envelope.level()
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

impl Default for Tine {
    fn default() -> Self {
        Self::new()
    }
}
