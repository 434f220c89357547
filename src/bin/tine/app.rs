//! TineApp - audio stream setup and the realtime callback

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;

use tine_dsp::{
    sequencing::{Phrase, PhrasePlayer},
    synth::{EventBuffer, SynthMessage, VoiceSnapshot},
    EngineConfig, TineSynth, MAX_BLOCK_SIZE,
};

use super::ui::{ControlMessage, UiApp, UiStateInit, VoiceFrame, MAX_VOICES_SHOWN};

/// Events one audio chunk can carry: phrase cues plus queued UI messages
const EVENT_CAPACITY: usize = 256;

pub struct TineApp {
    bpm: f64,
    config: EngineConfig,
    phrase: Phrase,
}

impl TineApp {
    pub fn new() -> Self {
        Self {
            bpm: 100.0,
            config: EngineConfig::default(),
            phrase: Phrase::new(4.0),
        }
    }

    pub fn bpm(mut self, bpm: f64) -> Self {
        self.bpm = bpm;
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn phrase(mut self, phrase: Phrase) -> Self {
        self.phrase = phrase;
        self
    }

    /// Open the default output device and run the TUI until the user quits.
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f64;
        let channels = config.channels() as usize;

        let (mut synth, scope_rx) =
            TineSynth::new(self.config).wrap_err("invalid engine configuration")?;
        synth
            .prepare(sample_rate, MAX_BLOCK_SIZE)
            .wrap_err("failed to prepare engine")?;

        let init = UiStateInit {
            bpm: self.bpm,
            beats: self.phrase.beats,
            sample_rate: sample_rate as f32,
            num_voices: synth.num_voices(),
            legacy_bend_range: synth.legacy_mode().map(|legacy| legacy.pitch_bend_range),
        };
        let params = synth.params();

        // --- Cross-thread rings ---
        let (msg_tx, mut msg_rx) = RingBuffer::<SynthMessage>::new(64);
        let (ctrl_tx, mut ctrl_rx) = RingBuffer::<ControlMessage>::new(16);
        let (mut voice_tx, voice_rx) = RingBuffer::<VoiceFrame>::new(8);

        let mut player = PhrasePlayer::new(&self.phrase, self.bpm, sample_rate);
        let mut events = EventBuffer::with_capacity(EVENT_CAPACITY);
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];
        let mut snapshots = [VoiceSnapshot::default(); MAX_VOICES_SHOWN];

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while let Ok(ctrl) = ctrl_rx.pop() {
                    match ctrl {
                        ControlMessage::TogglePlayback => player.toggle(&mut events),
                        ControlMessage::Reset => player.reset(),
                    }
                }
                events.drain_from(&mut msg_rx);

                while frames_written < total_frames {
                    let frames_remaining = total_frames - frames_written;
                    let frames_to_render = frames_remaining.min(MAX_BLOCK_SIZE);

                    player.process_block(frames_to_render, &mut events);

                    let block = &mut render_buf[..frames_to_render];
                    synth.render_block(block, events.as_mut_slice());
                    events.clear();

                    // Duplicate mono to all channels and write to device
                    let out_off = frames_written * channels;
                    for (i, &s) in block.iter().enumerate() {
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = s;
                        }
                    }

                    frames_written += frames_to_render;
                }

                let count = synth.collect_voice_snapshots(&mut snapshots);
                let frame = VoiceFrame {
                    voices: snapshots,
                    count: count as u8,
                    active: synth.active_voices() as u8,
                    progress: player.progress(),
                    is_playing: player.is_playing(),
                };
                // UI is behind: drop this frame, the next callback sends a newer one
                let _ = voice_tx.push(frame);
            },
            |err| eprintln!("Audio error: {err}"),
            None,
        )?;

        stream.play()?;

        let mut terminal = ratatui::init();
        let result = UiApp::new(scope_rx, voice_rx, msg_tx, ctrl_tx, params, init)
            .run(&mut terminal);
        ratatui::restore();

        drop(stream);
        result
    }
}

impl Default for TineApp {
    fn default() -> Self {
        Self::new()
    }
}
