// Purpose: Musical timing for demo playback
// Phrases are written in beats and played back sample-accurately

pub mod phrase;
pub mod player;

pub use phrase::{demo, Phrase, Step};
pub use player::PhrasePlayer;
