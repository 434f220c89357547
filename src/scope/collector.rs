//! Trigger-aligned scope frames.
//!
//! Raw blocks pulled from the queue start at arbitrary phase, so drawing them
//! directly makes a periodic waveform jitter sideways. The collector keeps two
//! windows of history and starts each frame on the most recent rising edge
//! through `trigger_level`, like the trigger knob on a hardware scope. With
//! no edge in range (silence, noise) it falls back to free-running and shows
//! the newest window.
//!
//! Runs on the UI thread; allocates only in `new`.

use crate::scope::queue::SnapshotReader;

pub const DEFAULT_TRIGGER_LEVEL: f32 = 0.01;

pub struct ScopeCollector {
    frame: Vec<f32>,
    history: Vec<f32>,
    scratch: Vec<f32>,
    trigger_level: f32,
    triggered: bool,
}

impl ScopeCollector {
    pub fn new(frame_len: usize) -> Self {
        let frame_len = frame_len.max(1);
        Self {
            frame: vec![0.0; frame_len],
            history: vec![0.0; frame_len * 2],
            scratch: vec![0.0; frame_len * 2],
            trigger_level: DEFAULT_TRIGGER_LEVEL,
            triggered: false,
        }
    }

    pub fn with_trigger_level(mut self, level: f32) -> Self {
        self.trigger_level = level;
        self
    }

    /// Drain the reader and rebuild the frame. Returns false when no new
    /// samples arrived.
    pub fn update(&mut self, reader: &mut SnapshotReader) -> bool {
        let mut received = 0;
        loop {
            let n = reader.pop(&mut self.scratch);
            if n == 0 {
                break;
            }
            self.append(n);
            received += n;
            if n < self.scratch.len() {
                break;
            }
        }

        if received == 0 {
            return false;
        }

        let len = self.frame.len();
        let start = match self.find_trigger() {
            Some(start) => {
                self.triggered = true;
                start
            }
            None => {
                self.triggered = false;
                len
            }
        };
        self.frame.copy_from_slice(&self.history[start..start + len]);
        true
    }

    fn append(&mut self, n: usize) {
        let n = n.min(self.history.len());
        self.history.rotate_left(n);
        let tail = self.history.len() - n;
        self.history[tail..].copy_from_slice(&self.scratch[..n]);
    }

    /// Latest rising edge that still leaves a full frame after it.
    fn find_trigger(&self) -> Option<usize> {
        let len = self.frame.len();
        (1..=len).rev().find(|&i| {
            self.history[i - 1] < self.trigger_level && self.history[i] >= self.trigger_level
        })
    }

    pub fn frame(&self) -> &[f32] {
        &self.frame
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered
    }
}
