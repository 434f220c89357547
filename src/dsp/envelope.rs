/*
Hammer/Damper Envelope
======================

A tine does not need a full ADSR. Once the hammer has struck, the metal rings
down on its own (the resonators own that decay). The envelope only models the
two mechanical contacts around it:

  hammer      A very short linear ramp from the current level to 1.0. Keeps
              the strike from producing a step discontinuity.

  damper      When the key is released the felt damper touches the tine and
              kills it exponentially. Release ends when the level drops below
              SILENCE, at which point the envelope reports Idle.


The Shape
---------

  Level
    1.0 ┐ ╱‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾╲
        │╱                   ╲
        │                     ╲__
    0.0 └──────────────────────────‾‾──→ Time
       Attack     Sustain     Release
      (hammer)  (free ring)   (damper)


The Math: Exponential Release
-----------------------------

Release multiplies the level by a fixed coefficient each sample. We want the
level to fall from 1.0 to SILENCE in `release_time` seconds:

    coeff^(release_time * sample_rate) = SILENCE
    coeff = exp(ln(SILENCE) / (release_time * sample_rate))

Starting from any level below 1.0 it gets there sooner, which is what a damper
does to an already quiet tine.


Retriggering
------------

note_on while the envelope is still sounding ramps up from the current level
instead of snapping to zero. The resonators add the new strike on top of the
existing motion, so the envelope must stay continuous too.
*/

use crate::MIN_TIME;

/// Level below which a sound is considered gone (-80 dB).
pub const SILENCE: f32 = 1.0e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,    // No contact, level = 0
    Attack,  // Hammer contact, ramping to 1.0
    Sustain, // Key held, tine rings freely
    Release, // Damper applied, exponential fall to 0
}

pub struct Envelope {
    attack_time: f32,  // seconds for a full 0 → 1 ramp
    release_time: f32, // seconds from 1.0 down to SILENCE

    // Derived from the sample rate in `prepare`
    attack_increment: f32,
    release_coeff: f32,

    stage: EnvelopeState,
    level: f32,
}

impl Envelope {
    pub fn new(attack: f32, release: f32) -> Self {
        let mut env = Self {
            attack_time: attack.max(MIN_TIME),
            release_time: release.max(MIN_TIME),
            attack_increment: 1.0,
            release_coeff: 0.0,
            stage: EnvelopeState::Idle,
            level: 0.0,
        };
        env.prepare(48_000.0);
        env
    }

    /// Derive per-sample rates and return to silence.
    pub fn prepare(&mut self, sample_rate: f32) {
        let sample_rate = sample_rate.max(1.0);
        self.attack_increment = 1.0 / (self.attack_time * sample_rate).max(1.0);
        self.release_coeff = (SILENCE.ln() / (self.release_time * sample_rate).max(1.0)).exp();
        self.reset();
    }

    /// Hammer contact.
    pub fn note_on(&mut self) {
        if matches!(self.stage, EnvelopeState::Idle) {
            self.level = 0.0;
        }
        self.stage = EnvelopeState::Attack;
    }

    /// Damper contact.
    pub fn note_off(&mut self) {
        if matches!(self.stage, EnvelopeState::Idle) {
            return;
        }
        self.stage = EnvelopeState::Release;
    }

    /// Advance by one sample and return the new level.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                self.level += self.attack_increment;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeState::Sustain;
                }
            }

            EnvelopeState::Sustain => {
                self.level = 1.0;
            }

            EnvelopeState::Release => {
                self.level *= self.release_coeff;
                if self.level < SILENCE {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeState::Idle)
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn render_samples(env: &mut Envelope, samples: usize) {
        for _ in 0..samples {
            env.next_sample();
        }
    }

    #[test]
    fn attack_reaches_full_level() {
        let mut env = Envelope::new(0.01, 0.1);
        env.prepare(SAMPLE_RATE);

        env.note_on();
        render_samples(&mut env, (0.01 * SAMPLE_RATE) as usize + 1);

        assert!(env.level() > 0.99, "expected attack to reach full level");
        assert_eq!(env.state(), EnvelopeState::Sustain);
    }

    #[test]
    fn release_falls_back_to_idle() {
        let release = 0.05;
        let mut env = Envelope::new(0.001, release);
        env.prepare(SAMPLE_RATE);

        env.note_on();
        render_samples(&mut env, 10);

        env.note_off();
        assert_eq!(env.state(), EnvelopeState::Release);
        render_samples(&mut env, (release * SAMPLE_RATE) as usize + 2);

        assert_eq!(env.level(), 0.0);
        assert_eq!(env.state(), EnvelopeState::Idle);
    }

    #[test]
    fn retrigger_is_continuous() {
        let mut env = Envelope::new(0.01, 0.1);
        env.prepare(SAMPLE_RATE);

        env.note_on();
        render_samples(&mut env, 20);
        env.note_off();
        render_samples(&mut env, 5);
        let before = env.level();

        env.note_on();
        let after = env.next_sample();
        assert!(after >= before, "retrigger should ramp up from the current level");
        assert!(after - before <= 0.1 + 1.0e-4);
    }

    #[test]
    fn note_off_while_idle_is_ignored() {
        let mut env = Envelope::new(0.01, 0.1);
        env.note_off();
        assert_eq!(env.state(), EnvelopeState::Idle);
        assert_eq!(env.next_sample(), 0.0);
    }
}
