//! Sample-accurate render dispatcher.
//!
//! `TineSynth` is the single entry point the audio callback talks to. Each
//! call to [`TineSynth::render_block`] clears the output, sorts the block's
//! events by offset and renders the pool in segments between consecutive
//! offsets, applying each event exactly at its sample. The finished block is
//! copied into the scope queue.
//!
//! ```text
//!   events:      on(60)@0        off(60)@37     on(64)@90
//!   block:   |----------------|--------------|--------------------|
//!            0               37             90                   128
//!            render [0,37)   render [37,90)  render [90,128)
//! ```
//!
//! Everything that can fail happens in [`TineSynth::new`] and
//! [`TineSynth::prepare`]. The render path does not allocate, lock, log or
//! return errors.

use std::sync::Arc;

use crate::{
    config::{EngineConfig, LegacyMode},
    error::{Error, Result},
    params::SharedParams,
    scope::queue::{snapshot_queue, SnapshotReader, SnapshotWriter},
    synth::{
        event::{sort_by_offset, NoteEvent, NoteEventKind},
        pool::VoicePool,
        voice::{Voice, VoiceSnapshot},
    },
    MAX_BLOCK_SIZE,
};

pub struct TineSynth {
    pool: VoicePool,
    params: Arc<SharedParams>,
    scope: SnapshotWriter,
    sample_rate: f64,
    max_block_size: usize,
    prepared: bool,
}

impl TineSynth {
    /// Build the engine and the read half of its scope queue.
    ///
    /// The voice pool and queue are allocated here and never resized. The
    /// engine must still be [`prepare`](Self::prepare)d before rendering.
    pub fn new(config: EngineConfig) -> Result<(Self, SnapshotReader)> {
        config.validate()?;

        let (scope, reader) = snapshot_queue(config.scope_capacity);
        let pool = VoicePool::new(
            config.num_voices,
            config.voice_stealing,
            config.legacy_mode.clone(),
        );

        log::debug!(
            "tine engine: {} voices, stealing {}, legacy mode {:?}, scope {} samples",
            config.num_voices,
            if config.voice_stealing { "on" } else { "off" },
            config.legacy_mode,
            config.scope_capacity,
        );

        let synth = Self {
            pool,
            params: Arc::new(SharedParams::new(config.params)),
            scope,
            sample_rate: 0.0,
            max_block_size: 0,
            prepared: false,
        };

        Ok((synth, reader))
    }

    /// Configure every voice for a stream. Silences all voices; the global
    /// sample clock keeps counting.
    pub fn prepare(&mut self, sample_rate: f64, max_block_size: usize) -> Result<()> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(Error::InvalidSampleRate(sample_rate));
        }
        if max_block_size == 0 {
            return Err(Error::InvalidBlockSize(max_block_size));
        }

        if max_block_size > MAX_BLOCK_SIZE {
            log::warn!(
                "max block size {max_block_size} exceeds the usual {MAX_BLOCK_SIZE}; \
                 rendering still works but callbacks will be long"
            );
        }
        if self.scope.capacity() < max_block_size {
            log::warn!(
                "scope capacity {} is smaller than a block of {max_block_size}; \
                 the scope will only see the tail of each block",
                self.scope.capacity()
            );
        }

        self.pool.set_params(self.params.load());
        self.pool.prepare(sample_rate);
        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;
        self.prepared = true;

        log::info!(
            "tine engine prepared: {sample_rate} Hz, blocks up to {max_block_size} samples"
        );
        Ok(())
    }

    /// Handle for automating parameters from another thread.
    pub fn params(&self) -> Arc<SharedParams> {
        Arc::clone(&self.params)
    }

    /// Render one block into `out`, applying `events` at their offsets.
    ///
    /// `events` is sorted in place (stable, so events sharing an offset keep
    /// their order). Offsets at or past the end of the block apply on its
    /// last sample.
    pub fn render_block(&mut self, out: &mut [f32], events: &mut [NoteEvent]) {
        out.fill(0.0);

        debug_assert!(self.prepared, "TineSynth::render_block called before prepare");
        if !self.prepared {
            return;
        }

        sort_by_offset(events);
        self.pool.set_params(self.params.load());

        let len = out.len();
        let last = len.saturating_sub(1);
        let mut cursor = 0;

        for event in events.iter() {
            let offset = event.offset.min(last);
            if offset > cursor {
                self.pool.render(out, cursor, offset - cursor);
                cursor = offset;
            }
            self.apply(event, offset);
        }

        if cursor < len {
            self.pool.render(out, cursor, len - cursor);
        }

        self.pool.advance(len);
        self.scope.push(out);
    }

    /// Render into several channels: channel 0 is synthesised, the others
    /// receive a copy.
    pub fn render_channels(&mut self, outputs: &mut [&mut [f32]], events: &mut [NoteEvent]) {
        let Some((first, rest)) = outputs.split_first_mut() else {
            return;
        };

        self.render_block(first, events);

        for channel in rest.iter_mut() {
            let n = channel.len().min(first.len());
            channel[..n].copy_from_slice(&first[..n]);
            channel[n..].fill(0.0);
        }
    }

    fn apply(&mut self, event: &NoteEvent, offset: usize) {
        match event.kind {
            NoteEventKind::NoteOn { note, velocity } => {
                self.pool.note_on(note, velocity, event.channel, offset);
            }
            NoteEventKind::NoteOff { note } => {
                self.pool.note_off(note, event.channel);
            }
            NoteEventKind::PitchBend(bend) => self.pool.pitch_bend(event.channel, bend),
            NoteEventKind::Pressure(pressure) => self.pool.pressure(event.channel, pressure),
            NoteEventKind::AllNotesOff => self.pool.all_notes_off(),
        }
    }

    pub fn num_voices(&self) -> usize {
        self.pool.num_voices()
    }

    pub fn voice(&self, index: usize) -> Option<&Voice> {
        self.pool.voice(index)
    }

    pub fn active_voices(&self) -> usize {
        self.pool.active_voices()
    }

    /// Copy per-voice state into `out` for display. Returns how many entries
    /// were written.
    pub fn collect_voice_snapshots(&self, out: &mut [VoiceSnapshot]) -> usize {
        self.pool.collect_snapshots(out)
    }

    pub fn is_polyphonic(&self) -> bool {
        self.pool.num_voices() > 1
    }

    pub fn voice_stealing_enabled(&self) -> bool {
        self.pool.voice_stealing()
    }

    pub fn legacy_mode(&self) -> Option<&LegacyMode> {
        self.pool.legacy_mode()
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Samples rendered since construction.
    pub fn clock(&self) -> u64 {
        self.pool.clock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 48_000.0;
    const BLOCK: usize = 128;

    fn synth(num_voices: usize) -> (TineSynth, SnapshotReader) {
        let config = EngineConfig::default().with_voices(num_voices);
        let (mut synth, reader) = TineSynth::new(config).unwrap();
        synth.prepare(SR, BLOCK).unwrap();
        (synth, reader)
    }

    #[test]
    fn rejects_invalid_setup() {
        assert!(matches!(
            TineSynth::new(EngineConfig::default().with_voices(0)),
            Err(Error::InvalidConfig(_))
        ));

        let (mut synth, _) = TineSynth::new(EngineConfig::default()).unwrap();
        assert_eq!(
            synth.prepare(0.0, BLOCK).err(),
            Some(Error::InvalidSampleRate(0.0))
        );
        assert!(matches!(
            synth.prepare(f64::NAN, BLOCK),
            Err(Error::InvalidSampleRate(_))
        ));
        assert_eq!(
            synth.prepare(SR, 0).err(),
            Some(Error::InvalidBlockSize(0))
        );
        assert!(!synth.is_prepared());
    }

    #[test]
    fn silent_block_is_zero() {
        let (mut synth, _) = synth(4);
        let mut out = vec![1.0; BLOCK];
        synth.render_block(&mut out, &mut []);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn note_on_starts_at_its_offset() {
        let (mut synth, _) = synth(4);
        let mut out = vec![0.0; BLOCK];
        let mut events = [NoteEvent::note_on(40, 1, 60, 1.0)];
        synth.render_block(&mut out, &mut events);

        assert!(out[..40].iter().all(|&s| s == 0.0));
        assert!(out[40..].iter().any(|&s| s != 0.0));
        assert_eq!(synth.active_voices(), 1);
    }

    #[test]
    fn unsorted_events_are_applied_in_offset_order() {
        let (mut a, _) = synth(4);
        let (mut b, _) = synth(4);

        let mut sorted = [
            NoteEvent::note_on(10, 1, 60, 0.8),
            NoteEvent::note_on(50, 1, 64, 0.8),
        ];
        let mut shuffled = [sorted[1], sorted[0]];

        let mut out_a = vec![0.0; BLOCK];
        let mut out_b = vec![0.0; BLOCK];
        a.render_block(&mut out_a, &mut sorted);
        b.render_block(&mut out_b, &mut shuffled);
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn offsets_past_block_end_apply_on_last_sample() {
        let (mut synth, _) = synth(4);
        let mut out = vec![0.0; BLOCK];
        let mut events = [NoteEvent::note_on(BLOCK * 4, 1, 60, 1.0)];
        synth.render_block(&mut out, &mut events);

        assert!(out[..BLOCK - 1].iter().all(|&s| s == 0.0));
        assert_eq!(synth.active_voices(), 1);
    }

    #[test]
    fn clock_advances_by_block_length() {
        let (mut synth, _) = synth(2);
        let mut out = vec![0.0; BLOCK];
        synth.render_block(&mut out, &mut []);
        synth.render_block(&mut out[..64], &mut []);
        assert_eq!(synth.clock(), (BLOCK + 64) as u64);

        // prepare silences voices but keeps the clock
        synth.prepare(44_100.0, BLOCK).unwrap();
        assert_eq!(synth.clock(), (BLOCK + 64) as u64);
    }

    #[test]
    fn scope_receives_rendered_block() {
        let (mut synth, mut reader) = synth(2);
        let mut out = vec![0.0; BLOCK];
        let mut events = [NoteEvent::note_on(0, 1, 67, 0.9)];
        synth.render_block(&mut out, &mut events);

        let mut tapped = vec![0.0; BLOCK];
        assert_eq!(reader.pop(&mut tapped), BLOCK);
        assert_eq!(tapped, out);
    }

    #[test]
    fn render_channels_copies_channel_zero() {
        let (mut synth, _) = synth(2);
        let mut left = vec![0.0; BLOCK];
        let mut right = vec![1.0; BLOCK];
        let mut events = [NoteEvent::note_on(0, 1, 60, 1.0)];
        {
            let mut outputs: [&mut [f32]; 2] = [&mut left, &mut right];
            synth.render_channels(&mut outputs, &mut events);
        }
        assert_eq!(left, right);
        assert!(left.iter().any(|&s| s != 0.0));
    }

    #[test]
    fn parameter_changes_reach_the_voices() {
        let (mut synth, _) = synth(2);
        let params = synth.params();
        params.set_amplitude(100.0);

        let mut out = vec![0.0; BLOCK];
        synth.render_block(&mut out, &mut []);
        assert_eq!(synth.pool.params().amplitude(), 100.0);
    }

    #[test]
    fn host_accessors_report_configuration() {
        let (synth, _) = synth(16);
        assert!(synth.is_polyphonic());
        assert!(synth.voice_stealing_enabled());
        assert!(synth.legacy_mode().is_some());
        assert_eq!(synth.num_voices(), 16);
        assert!(synth.voice(15).is_some());
        assert!(synth.voice(16).is_none());
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "before prepare")]
    fn render_before_prepare_asserts() {
        let (mut synth, _) = TineSynth::new(EngineConfig::default()).unwrap();
        let mut out = vec![0.0; BLOCK];
        synth.render_block(&mut out, &mut []);
    }
}
