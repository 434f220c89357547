//! Host-automatable instrument parameters.
//!
//! Two continuous values shape every note:
//!
//!   velocity    How hard the hammer hits the tine. Scales the strike
//!               displacement, sampled once at note-on.
//!
//!   amplitude   Pickup gain. Applied continuously to every sounding voice.
//!
//! `TineParams` is the plain value type (what a host would persist).
//! `SharedParams` is the same pair stored as atomics so a UI or automation
//! thread can write while the audio thread reads without locking.

use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const VELOCITY_RANGE: RangeInclusive<f32> = 0.1..=20.0;
pub const VELOCITY_DEFAULT: f32 = 10.0;

pub const AMPLITUDE_RANGE: RangeInclusive<f32> = 0.1..=100.0;
pub const AMPLITUDE_DEFAULT: f32 = 50.0;

/// Clamp into `range`, mapping NaN to the range start.
#[inline]
fn clamp_to(value: f32, range: &RangeInclusive<f32>) -> f32 {
    if value.is_nan() {
        return *range.start();
    }
    value.clamp(*range.start(), *range.end())
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TineParams {
    velocity: f32,
    amplitude: f32,
}

impl TineParams {
    pub fn new(velocity: f32, amplitude: f32) -> Self {
        Self {
            velocity: clamp_to(velocity, &VELOCITY_RANGE),
            amplitude: clamp_to(amplitude, &AMPLITUDE_RANGE),
        }
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn set_velocity(&mut self, velocity: f32) {
        self.velocity = clamp_to(velocity, &VELOCITY_RANGE);
    }

    pub fn set_amplitude(&mut self, amplitude: f32) {
        self.amplitude = clamp_to(amplitude, &AMPLITUDE_RANGE);
    }

    /// Strike scale in (0, 1]: the velocity parameter relative to its maximum.
    #[inline]
    pub fn strike_scale(&self) -> f32 {
        self.velocity / *VELOCITY_RANGE.end()
    }

    /// Pickup gain in (0, 1]: the amplitude parameter relative to its maximum.
    #[inline]
    pub fn pickup_gain(&self) -> f32 {
        self.amplitude / *AMPLITUDE_RANGE.end()
    }
}

impl Default for TineParams {
    fn default() -> Self {
        Self {
            velocity: VELOCITY_DEFAULT,
            amplitude: AMPLITUDE_DEFAULT,
        }
    }
}

/// Lock-free parameter store shared between the audio thread and its
/// controllers. Each value is an f32 bit pattern in an `AtomicU32`.
#[derive(Debug)]
pub struct SharedParams {
    velocity: AtomicU32,
    amplitude: AtomicU32,
}

impl SharedParams {
    pub fn new(params: TineParams) -> Self {
        Self {
            velocity: AtomicU32::new(params.velocity.to_bits()),
            amplitude: AtomicU32::new(params.amplitude.to_bits()),
        }
    }

    /// Read both values. Called once per render block.
    pub fn load(&self) -> TineParams {
        TineParams {
            velocity: f32::from_bits(self.velocity.load(Ordering::Relaxed)),
            amplitude: f32::from_bits(self.amplitude.load(Ordering::Relaxed)),
        }
    }

    /// Replace both values, e.g. after the host restores saved state.
    pub fn store(&self, params: TineParams) {
        self.set_velocity(params.velocity);
        self.set_amplitude(params.amplitude);
    }

    pub fn set_velocity(&self, velocity: f32) {
        let velocity = clamp_to(velocity, &VELOCITY_RANGE);
        self.velocity.store(velocity.to_bits(), Ordering::Relaxed);
    }

    pub fn set_amplitude(&self, amplitude: f32) {
        let amplitude = clamp_to(amplitude, &AMPLITUDE_RANGE);
        self.amplitude.store(amplitude.to_bits(), Ordering::Relaxed);
    }
}

impl Default for SharedParams {
    fn default() -> Self {
        Self::new(TineParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_declared_values() {
        let params = TineParams::default();
        assert_eq!(params.velocity(), VELOCITY_DEFAULT);
        assert_eq!(params.amplitude(), AMPLITUDE_DEFAULT);
    }

    #[test]
    fn setters_clamp_into_range() {
        let mut params = TineParams::new(100.0, -3.0);
        assert_eq!(params.velocity(), 20.0);
        assert_eq!(params.amplitude(), 0.1);

        params.set_velocity(f32::NAN);
        assert_eq!(params.velocity(), 0.1);

        params.set_amplitude(1_000.0);
        assert_eq!(params.amplitude(), 100.0);
    }

    #[test]
    fn shared_params_round_trip_through_atomics() {
        let shared = SharedParams::default();
        shared.set_velocity(4.5);
        shared.set_amplitude(250.0);

        let params = shared.load();
        assert_eq!(params.velocity(), 4.5);
        assert_eq!(params.amplitude(), 100.0);
    }

    #[test]
    fn scales_are_normalised_to_range_maximum() {
        let params = TineParams::new(20.0, 50.0);
        assert!((params.strike_scale() - 1.0).abs() < f32::EPSILON);
        assert!((params.pickup_gain() - 0.5).abs() < f32::EPSILON);
    }
}
