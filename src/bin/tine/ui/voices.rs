//! Voice pool panel - one row per slot with its note and envelope level

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tine_dsp::{dsp::EnvelopeState, io::converter::midi_note_to_freq};

use super::VoiceFrame;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

fn note_name(note: u8) -> String {
    let octave = i32::from(note / 12) - 1;
    format!("{}{}", NOTE_NAMES[usize::from(note % 12)], octave)
}

fn stage_style(stage: EnvelopeState) -> (&'static str, Color) {
    match stage {
        EnvelopeState::Idle => ("idle", Color::DarkGray),
        EnvelopeState::Attack => ("strike", Color::LightRed),
        EnvelopeState::Sustain => ("ring", Color::LightGreen),
        EnvelopeState::Release => ("damp", Color::LightYellow),
    }
}

pub fn render_voices(frame: &mut Frame, area: Rect, state: &VoiceFrame) {
    let block = Block::default()
        .title(format!(" Voices {} ", state.active))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let meter_width = inner.width.saturating_sub(30) as usize;
    let lines: Vec<Line> = state
        .voices()
        .iter()
        .take(inner.height as usize)
        .map(|voice| {
            let slot = Span::styled(
                format!("{:>2} ", voice.slot),
                Style::default().fg(Color::DarkGray),
            );
            let Some(note) = voice.note else {
                return Line::from(vec![slot, Span::styled("--", Style::default().fg(Color::DarkGray))]);
            };

            let (stage, color) = stage_style(voice.stage);
            // sqrt keeps quiet tails visible
            let filled = ((voice.level.clamp(0.0, 1.0).sqrt()) * meter_width as f32) as usize;

            Line::from(vec![
                slot,
                Span::styled(
                    format!("{:<4} {:>6.1}Hz ch{:<2} ", note_name(note), midi_note_to_freq(note), voice.channel),
                    Style::default().fg(Color::White),
                ),
                Span::styled(format!("{stage:<6} "), Style::default().fg(color)),
                Span::styled("█".repeat(filled), Style::default().fg(color)),
                Span::styled(
                    "░".repeat(meter_width.saturating_sub(filled)),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_names_follow_midi_octaves() {
        assert_eq!(note_name(60), "C4");
        assert_eq!(note_name(69), "A4");
        assert_eq!(note_name(21), "A0");
    }
}
