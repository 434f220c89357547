//! Benchmarks for full-pool rendering through the dispatcher.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tine_dsp::{EngineConfig, NoteEvent, TineSynth};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn engine(voices: usize, max_block: usize) -> TineSynth {
    let config = EngineConfig::default().with_voices(voices);
    let (mut synth, _scope) = TineSynth::new(config).expect("valid config");
    synth.prepare(SAMPLE_RATE, max_block).expect("valid stream");
    synth
}

/// A chord of `count` notes spread over four octaves
fn chord(count: usize) -> Vec<NoteEvent> {
    (0..count)
        .map(|i| NoteEvent::note_on(0, 1, 36 + (i as u8 * 7) % 48, 0.8))
        .collect()
}

pub fn bench_polyphony(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/polyphony");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for voices in [1usize, 8, 16] {
            let mut synth = engine(voices, size);
            let mut strike = chord(voices);
            synth.render_block(&mut buffer, &mut strike);

            group.bench_with_input(
                BenchmarkId::new(format!("sustained_{voices}"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        if synth.active_voices() < voices {
                            let mut strike = chord(voices);
                            synth.render_block(&mut buffer, &mut strike);
                        }
                        synth.render_block(black_box(&mut buffer), &mut []);
                    })
                },
            );
        }

        // Full pool plus a stealing note-on in the middle of every block
        let mut synth = engine(16, size);
        let mut strike = chord(16);
        synth.render_block(&mut buffer, &mut strike);
        let mut note = 40u8;
        group.bench_with_input(BenchmarkId::new("steal_mid_block", size), &size, |b, _| {
            b.iter(|| {
                note = 40 + (note - 39) % 40;
                let mut events = [
                    NoteEvent::note_on(size / 2, 1, note, 0.9),
                    NoteEvent::note_off(size - 1, 1, note),
                ];
                synth.render_block(black_box(&mut buffer), &mut events);
            })
        });
    }

    group.finish();
}
