//! Timed note events for one render block.

use crate::synth::message::{MessageReceiver, SynthMessage};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteEventKind {
    /// Velocity is normalised to 0.0..=1.0.
    NoteOn { note: u8, velocity: f32 },
    NoteOff { note: u8 },
    /// Bend position in -1.0..=1.0, scaled by the legacy pitch-bend range.
    PitchBend(f32),
    /// Channel pressure in 0.0..=1.0.
    Pressure(f32),
    AllNotesOff,
}

/// An event applied `offset` samples into the current block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    pub offset: usize,
    pub channel: u8,
    pub kind: NoteEventKind,
}

impl NoteEvent {
    pub fn note_on(offset: usize, channel: u8, note: u8, velocity: f32) -> Self {
        Self {
            offset,
            channel,
            kind: NoteEventKind::NoteOn { note, velocity },
        }
    }

    pub fn note_off(offset: usize, channel: u8, note: u8) -> Self {
        Self {
            offset,
            channel,
            kind: NoteEventKind::NoteOff { note },
        }
    }

    pub fn pitch_bend(offset: usize, channel: u8, bend: f32) -> Self {
        Self {
            offset,
            channel,
            kind: NoteEventKind::PitchBend(bend),
        }
    }

    pub fn pressure(offset: usize, channel: u8, pressure: f32) -> Self {
        Self {
            offset,
            channel,
            kind: NoteEventKind::Pressure(pressure),
        }
    }

    pub fn all_notes_off(offset: usize) -> Self {
        Self {
            offset,
            channel: 1,
            kind: NoteEventKind::AllNotesOff,
        }
    }
}

/// Stable in-place sort by offset.
///
/// Insertion sort: blocks carry a handful of events, usually already in
/// order, and `slice::sort_by_key` may allocate. Events sharing an offset keep
/// their arrival order so a note-on followed by its note-off stays that way.
pub fn sort_by_offset(events: &mut [NoteEvent]) {
    for i in 1..events.len() {
        let mut j = i;
        while j > 0 && events[j - 1].offset > events[j].offset {
            events.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Fixed-capacity event list reused across audio callbacks.
///
/// Allocates once at construction; `push` drops events once full instead of
/// growing, so it is safe to fill from the audio thread.
pub struct EventBuffer {
    events: Vec<NoteEvent>,
}

impl EventBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
        }
    }

    /// Append an event. Returns false (and drops it) when full.
    pub fn push(&mut self, event: NoteEvent) -> bool {
        if self.events.len() == self.events.capacity() {
            return false;
        }
        self.events.push(event);
        true
    }

    /// Move every pending message into the buffer at offset 0.
    ///
    /// Stops early when the buffer is full; the remaining messages stay queued
    /// for the next block. Returns how many were taken.
    pub fn drain_from<R: MessageReceiver + ?Sized>(&mut self, rx: &mut R) -> usize {
        let mut taken = 0;
        while self.events.len() < self.events.capacity() {
            let Some(msg) = rx.pop() else {
                break;
            };
            self.events.push(SynthMessage::to_event(msg, 0));
            taken += 1;
        }
        taken
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.events.capacity()
    }

    pub fn as_mut_slice(&mut self) -> &mut [NoteEvent] {
        &mut self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Script(Vec<SynthMessage>);

    impl MessageReceiver for Script {
        fn pop(&mut self) -> Option<SynthMessage> {
            if self.0.is_empty() {
                None
            } else {
                Some(self.0.remove(0))
            }
        }
    }

    #[test]
    fn sort_is_stable_for_equal_offsets() {
        let mut events = [
            NoteEvent::note_off(8, 1, 60),
            NoteEvent::note_on(2, 1, 60, 1.0),
            NoteEvent::note_off(2, 1, 60),
            NoteEvent::note_on(0, 1, 64, 1.0),
        ];

        sort_by_offset(&mut events);

        let offsets: Vec<usize> = events.iter().map(|e| e.offset).collect();
        assert_eq!(offsets, vec![0, 2, 2, 8]);
        assert!(matches!(events[1].kind, NoteEventKind::NoteOn { .. }));
        assert!(matches!(events[2].kind, NoteEventKind::NoteOff { .. }));
    }

    #[test]
    fn buffer_drops_events_when_full() {
        let mut buffer = EventBuffer::with_capacity(2);
        let capacity = buffer.capacity();
        for i in 0..capacity {
            assert!(buffer.push(NoteEvent::note_on(i, 1, 60, 1.0)));
        }
        assert!(!buffer.push(NoteEvent::note_on(0, 1, 61, 1.0)));
        assert_eq!(buffer.len(), capacity);
    }

    #[test]
    fn drain_leaves_overflow_queued() {
        let mut rx = Script(vec![
            SynthMessage::NoteOn {
                channel: 1,
                note: 60,
                velocity: 100,
            },
            SynthMessage::NoteOff {
                channel: 1,
                note: 60,
            },
            SynthMessage::AllNotesOff,
        ]);
        let mut buffer = EventBuffer::with_capacity(2);
        let capacity = buffer.capacity();

        let taken = buffer.drain_from(&mut rx);
        assert_eq!(taken, capacity.min(3));
        assert_eq!(rx.0.len(), 3 - taken);
        assert!(buffer.as_mut_slice().iter().all(|e| e.offset == 0));

        buffer.clear();
        assert!(buffer.is_empty());
    }
}
