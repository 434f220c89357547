//! Real-world scenario benchmarks.
//!
//! Full engine renders with many voices sounding, and the audio side of the
//! scope tap.

mod polyphony;
mod queue;

pub use polyphony::bench_polyphony;
pub use queue::bench_queue;
