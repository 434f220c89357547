//! Transport bar widget - tempo, phrase position, parameters and levels

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tine_dsp::TineParams;

use super::{UiStateInit, VoiceFrame};

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

pub fn render_transport(
    frame: &mut Frame,
    area: Rect,
    init: &UiStateInit,
    state: &VoiceFrame,
    params: &TineParams,
    bend: i16,
    stats: &AudioStats,
) {
    let block = Block::default().title(" tine ").borders(Borders::ALL);

    // 4/4 throughout
    let beat_position = state.progress * init.beats;
    let bar = (beat_position / 4.0) as u32 + 1;
    let beat = (beat_position % 4.0) as u32 + 1;

    let (play_symbol, play_color) = if state.is_playing {
        ("▶ Playing", Color::Green)
    } else {
        ("⏸ Paused", Color::Yellow)
    };

    let bend_text = match init.legacy_bend_range {
        Some(range) => format!("Bend: {:+.1}st  ", f32::from(bend) / 8192.0 * range),
        None => String::new(),
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" BPM: {:.0}  ", init.bpm),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(format!("{play_symbol}  "), Style::default().fg(play_color)),
        Span::styled(
            format!("Bar {bar} | Beat {beat}  "),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("Vel: {:.1}  Amp: {:.0}  ", params.velocity(), params.amplitude()),
            Style::default().fg(Color::LightBlue),
        ),
        Span::styled(bend_text, Style::default().fg(Color::LightBlue)),
        Span::styled(
            format!("Voices: {}/{}  ", state.active, init.num_voices),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("{:.1}kHz  ", init.sample_rate / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", stats.peak, stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
