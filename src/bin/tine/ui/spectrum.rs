//! Spectrum analyzer widget
//!
//! Hann-windowed FFT of the scope frame, sampled at log-spaced frequencies
//! and smoothed so partials fade rather than flicker.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::{f32::consts::TAU, sync::Arc};

const SPECTRUM_BINS: usize = 64;
const FLOOR_DB: f64 = -100.0;
/// Fraction of the previous value kept when a bin falls
const FALL_SMOOTHING: f64 = 0.8;

pub struct SpectrumAnalyzer {
    window: Vec<f32>,
    /// FFT bin per display point; the display x axis is log2(frequency)
    bin_indices: Vec<usize>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// (log2 Hz, dB)
    spectrum: Vec<(f64, f64)>,
    min_octave: f64,
    max_octave: f64,
}

impl SpectrumAnalyzer {
    pub fn new(frame_len: usize, sample_rate: f32) -> Self {
        let frame_len = frame_len.max(4);
        let fft = FftPlanner::new().plan_fft_forward(frame_len);

        let denom = (frame_len - 1) as f32;
        let window = (0..frame_len)
            .map(|i| 0.5 * (1.0 - (TAU * i as f32 / denom).cos()))
            .collect();

        let max_freq = (sample_rate as f64 / 2.0).clamp(40.0, 20_000.0);
        let min_octave = 20.0f64.log2();
        let max_octave = max_freq.log2();
        let half = frame_len / 2;

        let mut bin_indices = Vec::with_capacity(SPECTRUM_BINS);
        let mut spectrum = Vec::with_capacity(SPECTRUM_BINS);
        for i in 0..SPECTRUM_BINS {
            let t = i as f64 / (SPECTRUM_BINS - 1) as f64;
            let octave = min_octave + (max_octave - min_octave) * t;
            let freq = octave.exp2();
            let index = (freq * frame_len as f64 / sample_rate as f64).round() as usize;
            bin_indices.push(index.clamp(1, half - 1));
            spectrum.push((octave, FLOOR_DB));
        }

        Self {
            window,
            bin_indices,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); frame_len],
            spectrum,
            min_octave,
            max_octave,
        }
    }

    /// Analyse a frame. Frames of the wrong length are ignored.
    pub fn update(&mut self, frame: &[f32]) {
        if frame.len() != self.window.len() {
            return;
        }

        for ((bin, &sample), &w) in self.scratch.iter_mut().zip(frame).zip(&self.window) {
            *bin = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let norm = 2.0 / self.window.len() as f64;
        for ((_, db), &index) in self.spectrum.iter_mut().zip(&self.bin_indices) {
            let magnitude = self.scratch[index].norm() as f64 * norm;
            let fresh = (20.0 * magnitude.max(1e-9).log10()).max(FLOOR_DB);
            *db = if fresh >= *db {
                fresh
            } else {
                *db * FALL_SMOOTHING + fresh * (1.0 - FALL_SMOOTHING)
            };
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }

    pub fn octave_bounds(&self) -> [f64; 2] {
        [self.min_octave, self.max_octave]
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, analyzer: &SpectrumAnalyzer) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(analyzer.data());

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds(analyzer.octave_bounds())
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 0.0])
                .labels(vec!["-100", "-50", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
