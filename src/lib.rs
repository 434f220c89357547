pub mod config; // Engine construction settings
pub mod dsp;
pub mod error;
pub mod io;
pub mod params; // Host-automatable velocity and amplitude
pub mod scope; // Realtime-to-UI audio tap
pub mod sequencing; // Demo phrases and sample-accurate playback
pub mod synth; // Tine voices, pool and render dispatcher

pub use config::{EngineConfig, LegacyMode};
pub use error::{Error, Result};
pub use params::{SharedParams, TineParams};
pub use scope::{ScopeCollector, SnapshotReader, SnapshotWriter};
pub use synth::{NoteEvent, TineSynth};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub const MAX_VOICES: usize = 64;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
