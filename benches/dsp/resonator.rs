//! Benchmarks for a single modal resonator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tine_dsp::dsp::resonator::Resonator;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_resonator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/resonator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        let mut mode = Resonator::new();
        mode.tune(440.0, 4.0, SAMPLE_RATE as f32);
        mode.strike(1.0);
        group.bench_with_input(BenchmarkId::new("ringing", size), &size, |b, _| {
            b.iter(|| {
                if mode.energy() < 1e-6 {
                    mode.strike(1.0);
                }
                for sample in buffer.iter_mut() {
                    *sample = mode.next_sample();
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
