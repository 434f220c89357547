//! Engine construction settings.

use std::ops::RangeInclusive;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    params::TineParams,
    MAX_VOICES,
};

/// Pitch-bend range the legacy mode is enabled with, in semitones.
pub const LEGACY_PITCH_BEND_RANGE: f32 = 24.0;

/// Fixed-channel compatibility mode.
///
/// All incoming channels inside `channels` are treated as one keyboard: a
/// repeated (note, channel) pair re-triggers the voice already bound to it,
/// and channel pitch bend spans `pitch_bend_range` semitones. Events on other
/// channels are ignored.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyMode {
    pub pitch_bend_range: f32,
    pub channels: RangeInclusive<u8>,
}

impl LegacyMode {
    pub fn new(pitch_bend_range: f32) -> Self {
        Self {
            pitch_bend_range,
            channels: 1..=16,
        }
    }

    pub fn with_channels(mut self, channels: RangeInclusive<u8>) -> Self {
        self.channels = channels;
        self
    }

    #[inline]
    pub fn accepts(&self, channel: u8) -> bool {
        self.channels.contains(&channel)
    }
}

impl Default for LegacyMode {
    fn default() -> Self {
        Self::new(LEGACY_PITCH_BEND_RANGE)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Size of the voice pool, fixed for the engine's lifetime.
    pub num_voices: usize,
    /// Steal the oldest voice when the pool is exhausted. When disabled,
    /// notes beyond capacity are dropped.
    pub voice_stealing: bool,
    pub legacy_mode: Option<LegacyMode>,
    /// Samples held by the scope snapshot queue.
    pub scope_capacity: usize,
    /// Initial parameter values.
    pub params: TineParams,
}

impl EngineConfig {
    pub fn with_voices(mut self, num_voices: usize) -> Self {
        self.num_voices = num_voices;
        self
    }

    pub fn with_legacy_mode(mut self, legacy_mode: Option<LegacyMode>) -> Self {
        self.legacy_mode = legacy_mode;
        self
    }

    pub fn with_scope_capacity(mut self, scope_capacity: usize) -> Self {
        self.scope_capacity = scope_capacity;
        self
    }

    pub fn with_params(mut self, params: TineParams) -> Self {
        self.params = params;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_voices == 0 || self.num_voices > MAX_VOICES {
            return Err(Error::InvalidConfig(format!(
                "num_voices must be in 1..={MAX_VOICES}, got {}",
                self.num_voices
            )));
        }

        if self.scope_capacity == 0 {
            return Err(Error::InvalidConfig(
                "scope_capacity must be non-zero".to_string(),
            ));
        }

        if let Some(legacy) = &self.legacy_mode {
            if !(legacy.pitch_bend_range.is_finite() && legacy.pitch_bend_range >= 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "pitch_bend_range must be a non-negative number, got {}",
                    legacy.pitch_bend_range
                )));
            }
            if legacy.channels.is_empty()
                || *legacy.channels.start() < 1
                || *legacy.channels.end() > 16
            {
                return Err(Error::InvalidConfig(format!(
                    "legacy channel range must lie within 1..=16, got {:?}",
                    legacy.channels
                )));
            }
        }

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            num_voices: 16,
            voice_stealing: true,
            legacy_mode: Some(LegacyMode::default()),
            scope_capacity: 4096,
            params: TineParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.voice_stealing);
        assert_eq!(
            config.legacy_mode.as_ref().map(|l| l.pitch_bend_range),
            Some(24.0)
        );
    }

    #[test]
    fn rejects_empty_or_oversized_pool() {
        assert!(matches!(
            EngineConfig::default().with_voices(0).validate(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            EngineConfig::default().with_voices(MAX_VOICES + 1).validate(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_zero_scope_capacity() {
        let config = EngineConfig::default().with_scope_capacity(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_channels_outside_midi_range() {
        let legacy = LegacyMode::default().with_channels(1..=17);
        let config = EngineConfig::default().with_legacy_mode(Some(legacy));
        assert!(config.validate().is_err());
    }

    #[test]
    fn legacy_mode_filters_channels() {
        let legacy = LegacyMode::default().with_channels(2..=4);
        assert!(!legacy.accepts(1));
        assert!(legacy.accepts(3));
        assert!(!legacy.accepts(5));
    }
}
