//! Sample-accurate phrase playback.
//!
//! The player runs in the audio thread. Beat positions are converted to
//! sample positions once, in [`PhrasePlayer::new`]; each block then only
//! walks a cursor over the precomputed cues and emits [`NoteEvent`]s carrying
//! their exact offset inside the block.

use crate::synth::event::{EventBuffer, NoteEvent};
use crate::sequencing::phrase::Phrase;

#[derive(Debug, Clone, Copy, PartialEq)]
enum CueKind {
    On { velocity: f32 },
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cue {
    /// Samples from the start of the loop
    at: u64,
    channel: u8,
    note: u8,
    kind: CueKind,
}

pub struct PhrasePlayer {
    cues: Vec<Cue>,
    loop_len: u64,
    position: u64,
    next: usize,
    playing: bool,
    looping: bool,
}

fn beats_to_samples(beats: f64, samples_per_beat: f64) -> u64 {
    (beats.max(0.0) * samples_per_beat).round() as u64
}

impl PhrasePlayer {
    pub fn new(phrase: &Phrase, bpm: f64, sample_rate: f64) -> Self {
        let samples_per_beat = sample_rate * 60.0 / bpm.max(1.0);
        let loop_len = beats_to_samples(phrase.beats, samples_per_beat).max(1);
        let last = loop_len - 1;

        let mut cues = Vec::new();
        for step in &phrase.steps {
            let start = beats_to_samples(step.beat, samples_per_beat);
            if start >= last {
                continue;
            }
            let end = beats_to_samples(step.beat + step.length, samples_per_beat)
                .max(start + 1)
                .min(last);
            let velocity = f32::from(step.velocity.min(127)) / 127.0;

            for &note in &step.notes {
                cues.push(Cue {
                    at: start,
                    channel: step.channel,
                    note,
                    kind: CueKind::On { velocity },
                });
                cues.push(Cue {
                    at: end,
                    channel: step.channel,
                    note,
                    kind: CueKind::Off,
                });
            }
        }

        // Releases before strikes on the same sample so a repeated note is
        // re-struck rather than cut
        cues.sort_by_key(|cue| (cue.at, matches!(cue.kind, CueKind::On { .. })));

        Self {
            cues,
            loop_len,
            position: 0,
            next: 0,
            playing: true,
            looping: true,
        }
    }

    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Queue the events falling inside the next `block_size` samples.
    ///
    /// Events that do not fit in `events` are dropped.
    pub fn process_block(&mut self, block_size: usize, events: &mut EventBuffer) {
        if !self.playing {
            return;
        }

        let mut offset = 0;
        while offset < block_size {
            let span = ((block_size - offset) as u64).min(self.loop_len - self.position);
            let end = self.position + span;

            while let Some(cue) = self.cues.get(self.next) {
                if cue.at >= end {
                    break;
                }
                let at = offset + (cue.at - self.position) as usize;
                let event = match cue.kind {
                    CueKind::On { velocity } => NoteEvent::note_on(at, cue.channel, cue.note, velocity),
                    CueKind::Off => NoteEvent::note_off(at, cue.channel, cue.note),
                };
                events.push(event);
                self.next += 1;
            }

            self.position = end;
            offset += span as usize;

            if self.position >= self.loop_len {
                self.position = 0;
                self.next = 0;
                if !self.looping {
                    self.playing = false;
                    return;
                }
            }
        }
    }

    /// Pause or resume. Pausing releases everything still held.
    pub fn toggle(&mut self, events: &mut EventBuffer) {
        self.playing = !self.playing;
        if !self.playing {
            events.push(NoteEvent::all_notes_off(0));
        }
    }

    pub fn reset(&mut self) {
        self.position = 0;
        self.next = 0;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Position in the loop, 0.0..1.0.
    pub fn progress(&self) -> f64 {
        self.position as f64 / self.loop_len as f64
    }

    pub fn loop_len(&self) -> u64 {
        self.loop_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::event::NoteEventKind;

    // 60 bpm at 100 Hz: one beat is 100 samples
    fn player(phrase: &Phrase) -> PhrasePlayer {
        PhrasePlayer::new(phrase, 60.0, 100.0)
    }

    #[test]
    fn events_land_on_exact_offsets() {
        let phrase = Phrase::new(4.0).chord(0.5, 1.0, &[60], 127);
        let mut player = player(&phrase);
        let mut events = EventBuffer::with_capacity(8);

        player.process_block(64, &mut events);
        player.process_block(64, &mut events);
        let slice = events.as_mut_slice();
        assert_eq!(slice.len(), 1);
        // beat 0.5 = sample 50 = offset 50 of the first block
        assert_eq!(slice[0].offset, 50);
        assert!(matches!(slice[0].kind, NoteEventKind::NoteOn { note: 60, .. }));

        events.clear();
        player.process_block(64, &mut events);
        let slice = events.as_mut_slice();
        // note-off at sample 150 = offset 22 of the third block
        assert_eq!(slice.len(), 1);
        assert_eq!(slice[0].offset, 22);
        assert_eq!(slice[0].kind, NoteEventKind::NoteOff { note: 60 });
    }

    #[test]
    fn loop_wraps_inside_a_block() {
        let phrase = Phrase::new(1.0).chord(0.0, 0.5, &[60], 100);
        let mut player = player(&phrase);
        let mut events = EventBuffer::with_capacity(8);

        player.process_block(150, &mut events);
        let offsets: Vec<usize> = events.as_mut_slice().iter().map(|e| e.offset).collect();
        // on@0, off@50, on@100 (next loop)
        assert_eq!(offsets, vec![0, 50, 100]);
    }

    #[test]
    fn releases_precede_strikes_on_the_same_sample() {
        let phrase = Phrase::new(2.0)
            .chord(0.0, 1.0, &[60], 100)
            .chord(1.0, 0.5, &[60], 100);
        let mut player = player(&phrase);
        let mut events = EventBuffer::with_capacity(8);

        player.process_block(120, &mut events);
        let kinds: Vec<NoteEventKind> = events.as_mut_slice().iter().map(|e| e.kind).collect();
        assert!(matches!(kinds[1], NoteEventKind::NoteOff { note: 60 }));
        assert!(matches!(kinds[2], NoteEventKind::NoteOn { note: 60, .. }));
    }

    #[test]
    fn one_shot_stops_at_the_end() {
        let phrase = Phrase::new(1.0).chord(0.0, 0.5, &[60], 100);
        let mut player = player(&phrase).with_looping(false);
        let mut events = EventBuffer::with_capacity(8);

        player.process_block(300, &mut events);
        assert_eq!(events.len(), 2);
        assert!(!player.is_playing());
    }

    #[test]
    fn pausing_releases_held_notes() {
        let phrase = Phrase::new(1.0).chord(0.0, 0.9, &[60], 100);
        let mut player = player(&phrase);
        let mut events = EventBuffer::with_capacity(8);

        player.toggle(&mut events);
        assert!(!player.is_playing());
        assert_eq!(events.as_mut_slice()[0].kind, NoteEventKind::AllNotesOff);

        events.clear();
        player.process_block(100, &mut events);
        assert!(events.is_empty());
    }
}
