//! Benchmarks for the state-variable filter in its two tine roles.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tine_dsp::dsp::filter::SVFilter;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Sawtooth-like ramp
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        // Tone control
        let mut filter = SVFilter::lowpass(4000.0);
        filter.prepare(SAMPLE_RATE as f32);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("lowpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer));
            })
        });

        // DC blocker after the pickup
        let mut filter = SVFilter::highpass(20.0);
        filter.prepare(SAMPLE_RATE as f32);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("dc_block", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
