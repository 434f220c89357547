// Purpose: Voice model, voice pool, note events and the render dispatcher
// This layer sits above the dsp primitives and is driven by the audio callback

pub mod engine;
pub mod event;
pub mod message;
pub mod pool;
pub mod tine;
pub mod voice;

pub use engine::TineSynth;
pub use event::{EventBuffer, NoteEvent, NoteEventKind};
pub use message::{MessageReceiver, SynthMessage};
pub use pool::{Allocation, VoicePool};
pub use voice::VoiceSnapshot;
