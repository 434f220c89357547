//! Benchmarks for one complete tine voice.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tine_dsp::synth::tine::Tine;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_tine(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/tine");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Held note: strike once, keep rendering the ring
        let mut tine = Tine::new();
        tine.prepare(SAMPLE_RATE);
        tine.start(48, 0.8);
        group.bench_with_input(BenchmarkId::new("ring", size), &size, |b, _| {
            b.iter(|| {
                if !tine.is_sounding() {
                    tine.start(48, 0.8);
                }
                buffer.fill(0.0);
                tine.render_block(black_box(&mut buffer), 0, size);
            })
        });

        // Fresh strike every block: attack path and filter retuning
        let mut tine = Tine::new();
        tine.prepare(SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("strike", size), &size, |b, _| {
            b.iter(|| {
                tine.start(black_box(72), 1.0);
                buffer.fill(0.0);
                tine.render_block(black_box(&mut buffer), 0, size);
            })
        });
    }

    group.finish();
}
