//! tine-render - offline render of the demo phrase to a WAV file
//!
//! Usage: tine-render [OUT.wav] [--loops N] [--rate HZ] [--voices N] [--block N]
//!
//! Set RUST_LOG=debug to see engine setup messages.

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use std::path::PathBuf;

use tine_dsp::{
    sequencing::{self, PhrasePlayer},
    synth::EventBuffer,
    EngineConfig, TineSynth,
};

const BPM: f64 = 92.0;
/// Release tail rendered after the last loop
const TAIL_SECONDS: f64 = 3.0;

struct Options {
    output: PathBuf,
    loops: u32,
    sample_rate: u32,
    voices: usize,
    block_size: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            output: PathBuf::from("tine_demo.wav"),
            loops: 2,
            sample_rate: 48_000,
            voices: 16,
            block_size: 256,
        }
    }
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<String>) -> EyreResult<T> {
    let value = value.ok_or_else(|| eyre!("{flag} needs a value"))?;
    value
        .parse()
        .map_err(|_| eyre!("invalid value for {flag}: {value}"))
}

fn parse_args() -> EyreResult<Options> {
    let mut options = Options::default();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--loops" => options.loops = parse_value(&arg, args.next())?,
            "--rate" => options.sample_rate = parse_value(&arg, args.next())?,
            "--voices" => options.voices = parse_value(&arg, args.next())?,
            "--block" => options.block_size = parse_value(&arg, args.next())?,
            flag if flag.starts_with("--") => return Err(eyre!("unknown option {flag}")),
            path => options.output = PathBuf::from(path),
        }
    }

    Ok(options)
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    env_logger::init();

    let options = parse_args()?;
    let sample_rate = f64::from(options.sample_rate);

    let config = EngineConfig::default().with_voices(options.voices);
    let (mut synth, _scope) = TineSynth::new(config).wrap_err("invalid engine configuration")?;
    synth
        .prepare(sample_rate, options.block_size)
        .wrap_err("failed to prepare engine")?;

    let phrase = sequencing::demo();
    let mut player = PhrasePlayer::new(&phrase, BPM, sample_rate);

    let phrase_len = player.loop_len() as usize * options.loops as usize;
    let tail_len = (TAIL_SECONDS * sample_rate) as usize;
    let total = phrase_len + tail_len;

    log::info!(
        "rendering {} loop(s) of the demo phrase ({:.1}s) to {}",
        options.loops,
        total as f64 / sample_rate,
        options.output.display()
    );

    let mut events = EventBuffer::with_capacity(256);
    let mut samples = vec![0.0f32; total];
    let mut position = 0;

    for block in samples.chunks_mut(options.block_size) {
        // Every cue lies inside the loop, so the last release lands before
        // the tail starts
        let cued = phrase_len.saturating_sub(position).min(block.len());
        if cued > 0 {
            player.process_block(cued, &mut events);
        }

        synth.render_block(block, events.as_mut_slice());
        events.clear();
        position += block.len();
    }

    let peak = samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
    log::debug!("peak level {peak:.3}");
    if peak > 1.0 {
        log::warn!("output clips (peak {peak:.2}); lower the amplitude or voice count");
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: options.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&options.output, spec)
        .wrap_err_with(|| format!("failed to create {}", options.output.display()))?;
    for &sample in &samples {
        writer
            .write_sample((sample.clamp(-1.0, 1.0) * 32767.0) as i16)
            .wrap_err("failed to write sample")?;
    }
    writer.finalize().wrap_err("failed to finalize WAV")?;

    println!("Wrote {} samples to {}", total, options.output.display());
    Ok(())
}
