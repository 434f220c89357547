//! TUI module for tine
//!
//! Scope, spectrum and voice-pool views of the running engine, plus keyboard
//! control of the phrase and parameters.

mod spectrum;
mod state;
mod transport;
mod voices;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use std::{sync::Arc, time::Duration};
use tine_dsp::{synth::SynthMessage, ScopeCollector, SharedParams, SnapshotReader};

pub use state::{ControlMessage, UiStateInit, VoiceFrame, MAX_VOICES_SHOWN};

use spectrum::{render_spectrum, SpectrumAnalyzer};
use transport::{render_transport, AudioStats};
use voices::render_voices;
use waveform::render_waveform;

/// Scope frame length, also the FFT size
const SCOPE_FRAME_LEN: usize = 1024;
const AMPLITUDE_STEP: f32 = 5.0;
const VELOCITY_STEP: f32 = 1.0;
/// One step is two semitones at the legacy range of 24
const BEND_STEP: i16 = 683;

pub struct UiApp {
    scope_rx: SnapshotReader,
    voice_rx: Consumer<VoiceFrame>,
    msg_tx: Producer<SynthMessage>,
    ctrl_tx: Producer<ControlMessage>,
    params: Arc<SharedParams>,
    init: UiStateInit,
    scope: ScopeCollector,
    spectrum: SpectrumAnalyzer,
    voices: VoiceFrame,
    bend: i16,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        scope_rx: SnapshotReader,
        voice_rx: Consumer<VoiceFrame>,
        msg_tx: Producer<SynthMessage>,
        ctrl_tx: Producer<ControlMessage>,
        params: Arc<SharedParams>,
        init: UiStateInit,
    ) -> Self {
        let spectrum = SpectrumAnalyzer::new(SCOPE_FRAME_LEN, init.sample_rate);
        Self {
            scope_rx,
            voice_rx,
            msg_tx,
            ctrl_tx,
            params,
            init,
            scope: ScopeCollector::new(SCOPE_FRAME_LEN),
            spectrum,
            voices: VoiceFrame::default(),
            bend: 0,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            if self.scope.update(&mut self.scope_rx) {
                self.spectrum.update(self.scope.frame());
            }

            // Keep only the latest voice frame
            while let Ok(frame) = self.voice_rx.pop() {
                self.voices = frame;
            }

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        let params = self.params.load();
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => {
                let _ = self.ctrl_tx.push(ControlMessage::TogglePlayback);
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                let _ = self.ctrl_tx.push(ControlMessage::Reset);
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                let _ = self.msg_tx.push(SynthMessage::AllNotesOff);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.params.set_amplitude(params.amplitude() + AMPLITUDE_STEP);
            }
            KeyCode::Char('-') => {
                self.params.set_amplitude(params.amplitude() - AMPLITUDE_STEP);
            }
            KeyCode::Char(']') => {
                self.params.set_velocity(params.velocity() + VELOCITY_STEP);
            }
            KeyCode::Char('[') => {
                self.params.set_velocity(params.velocity() - VELOCITY_STEP);
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Up => {
                self.bend = match key {
                    KeyCode::Left => self.bend.saturating_sub(BEND_STEP).max(-8192),
                    KeyCode::Right => self.bend.saturating_add(BEND_STEP).min(8191),
                    _ => 0,
                };
                for channel in 1..=2 {
                    let _ = self.msg_tx.push(SynthMessage::PitchBend {
                        channel,
                        value: self.bend,
                    });
                }
            }
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Min(8),    // Waveform
                Constraint::Length(14), // Spectrum + voices
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        let lower = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2]);

        let stats = AudioStats::from_buffer(self.scope.frame());
        render_transport(
            frame,
            chunks[0],
            &self.init,
            &self.voices,
            &self.params.load(),
            self.bend,
            &stats,
        );
        render_waveform(frame, chunks[1], self.scope.frame(), self.scope.is_triggered());
        render_spectrum(frame, lower[0], &self.spectrum);
        render_voices(frame, lower[1], &self.voices);

        let help = Paragraph::new(
            " [Q] Quit  [Space] Play/Pause  [R] Restart  [P] Panic  [+/-] Amp  [[/]] Vel  [←/→/↑] Bend",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
