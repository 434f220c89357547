//! Damped modal resonator.
//!
//! One vibrating mode of the tine, modelled as a complex phasor that is
//! rotated and shrunk by a fixed coefficient every sample:
//!
//! ```text
//!   z[n+1] = z[n] * r * e^(i*w)        w = 2*pi*f / sample_rate
//!   out[n] = Im(z[n])                  r = 10^(-3 / (t60 * sample_rate))
//! ```
//!
//! A strike adds a real-valued impulse to `z`, so the output starts at zero
//! and rings as a decaying sine. Striking an already ringing mode adds energy
//! to the existing motion instead of restarting it. Retuning only swaps the
//! coefficient, which keeps the waveform continuous under pitch bend. A mode
//! bent out of band is muted: it holds its state and resumes where it left
//! off once it is bent back.
//!
//! State is kept in f64: long low notes run for hundreds of thousands of
//! rotations and f32 rounding would audibly drift the amplitude.

use std::f64::consts::TAU;

/// Below this energy the mode is flushed to exact zero.
const FLUSH_ENERGY: f64 = 1.0e-24;

#[derive(Debug, Clone, Copy, Default)]
pub struct Resonator {
    re: f64,
    im: f64,
    coeff_re: f64,
    coeff_im: f64,
    enabled: bool,
}

impl Resonator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set frequency and decay. Modes at or above `0.45 * sample_rate` are
    /// muted rather than aliased; a muted mode keeps its phasor.
    pub fn tune(&mut self, frequency: f32, t60: f32, sample_rate: f32) {
        let sample_rate = f64::from(sample_rate.max(1.0));
        let frequency = f64::from(frequency);

        if !(frequency > 0.0 && frequency < 0.45 * sample_rate) {
            self.enabled = false;
            return;
        }

        let samples = f64::from(t60.max(1.0e-3)) * sample_rate;
        let radius = 10f64.powf(-3.0 / samples);
        let w = TAU * frequency / sample_rate;

        self.coeff_re = radius * w.cos();
        self.coeff_im = radius * w.sin();
        self.enabled = true;
    }

    /// Add a strike of the given amplitude.
    pub fn strike(&mut self, amplitude: f32) {
        if self.enabled {
            self.re += f64::from(amplitude);
        }
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if !self.enabled {
            return 0.0;
        }

        let re = self.re * self.coeff_re - self.im * self.coeff_im;
        let im = self.re * self.coeff_im + self.im * self.coeff_re;
        self.re = re;
        self.im = im;

        if self.energy() < FLUSH_ENERGY {
            self.reset();
        }

        self.im as f32
    }

    /// Squared magnitude of the phasor (amplitude envelope squared). Muted
    /// modes still report the energy they hold.
    #[inline]
    pub fn energy(&self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn reset(&mut self) {
        self.re = 0.0;
        self.im = 0.0;
    }
}
