//! Benchmarks for the scope snapshot queue.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tine_dsp::scope::snapshot_queue;

use crate::BLOCK_SIZES;

pub fn bench_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/queue");

    for &size in BLOCK_SIZES {
        let block: Vec<f32> = (0..size).map(|i| i as f32).collect();

        // Nobody reading: every push overwrites
        let (mut tx, _rx) = snapshot_queue(4096);
        group.bench_with_input(BenchmarkId::new("push_unread", size), &size, |b, _| {
            b.iter(|| tx.push(black_box(&block)))
        });

        // Reader keeping up
        let (mut tx, mut rx) = snapshot_queue(4096);
        let mut dest = vec![0.0f32; size];
        group.bench_with_input(BenchmarkId::new("push_pop", size), &size, |b, _| {
            b.iter(|| {
                tx.push(black_box(&block));
                black_box(rx.pop(&mut dest));
            })
        });
    }

    group.finish();
}
