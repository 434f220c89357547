//! Benchmarks for low-level DSP primitives.

mod filter;
mod resonator;
mod tine;

pub use filter::bench_filter;
pub use resonator::bench_resonator;
pub use tine::bench_tine;
