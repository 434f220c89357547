//! Looping note phrases measured in beats.

/// One chord (or single note) held for `length` beats starting at `beat`.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub beat: f64,
    pub length: f64,
    pub notes: Vec<u8>,
    /// MIDI velocity (1-127)
    pub velocity: u8,
    /// 1-based MIDI channel
    pub channel: u8,
}

/// A loop of steps. Steps may overlap; anything reaching past the loop end is
/// cut at the loop boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Phrase {
    pub steps: Vec<Step>,
    pub beats: f64,
}

impl Phrase {
    pub fn new(beats: f64) -> Self {
        Self {
            steps: Vec::new(),
            beats,
        }
    }

    /// Add a step on channel 1.
    pub fn chord(self, beat: f64, length: f64, notes: &[u8], velocity: u8) -> Self {
        self.chord_on(1, beat, length, notes, velocity)
    }

    pub fn chord_on(
        mut self,
        channel: u8,
        beat: f64,
        length: f64,
        notes: &[u8],
        velocity: u8,
    ) -> Self {
        self.steps.push(Step {
            beat,
            length,
            notes: notes.to_vec(),
            velocity,
            channel,
        });
        self
    }

    /// Spread `notes` upwards one per `spacing` beats, each ringing for
    /// `length` beats.
    pub fn arpeggio(
        mut self,
        channel: u8,
        beat: f64,
        spacing: f64,
        length: f64,
        notes: &[u8],
        velocity: u8,
    ) -> Self {
        for (i, &note) in notes.iter().enumerate() {
            self.steps.push(Step {
                beat: beat + spacing * i as f64,
                length,
                notes: vec![note],
                velocity,
                channel,
            });
        }
        self
    }

    /// Largest number of notes held at once, ignoring tails.
    pub fn max_polyphony(&self) -> usize {
        self.steps
            .iter()
            .map(|step| {
                self.steps
                    .iter()
                    .filter(|other| other.beat <= step.beat && step.beat < other.beat + other.length)
                    .map(|other| other.notes.len())
                    .sum::<usize>()
            })
            .max()
            .unwrap_or(0)
    }
}

/// Four bars of a ii-V-I-VI turnaround in D major, voiced for the middle
/// of the keyboard with an arpeggiated top line on channel 2.
pub fn demo() -> Phrase {
    // Em9, A13, Dmaj9, B7(b9)
    const EM9: [u8; 4] = [52, 55, 59, 66];
    const A13: [u8; 4] = [55, 61, 66, 69];
    const DMAJ9: [u8; 4] = [54, 57, 61, 64];
    const B7B9: [u8; 4] = [51, 57, 60, 63];

    Phrase::new(16.0)
        .chord_on(1, 0.0, 0.5, &[40], 110)
        .chord(0.0, 3.5, &EM9, 84)
        .chord_on(1, 4.0, 0.5, &[45], 110)
        .chord(4.0, 3.5, &A13, 80)
        .chord_on(1, 8.0, 0.5, &[38], 110)
        .chord(8.0, 3.5, &DMAJ9, 88)
        .chord_on(1, 12.0, 0.5, &[47], 110)
        .chord(12.0, 3.5, &B7B9, 76)
        .arpeggio(2, 1.0, 0.5, 0.45, &[71, 74, 78, 81], 96)
        .arpeggio(2, 5.0, 0.5, 0.45, &[73, 76, 78, 81], 92)
        .arpeggio(2, 9.0, 0.5, 0.45, &[73, 76, 81, 85], 100)
        .arpeggio(2, 13.0, 0.5, 0.45, &[72, 75, 78, 81], 90)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arpeggio_spaces_notes() {
        let phrase = Phrase::new(4.0).arpeggio(2, 1.0, 0.5, 0.25, &[60, 64, 67], 100);
        let beats: Vec<f64> = phrase.steps.iter().map(|s| s.beat).collect();
        assert_eq!(beats, vec![1.0, 1.5, 2.0]);
        assert!(phrase.steps.iter().all(|s| s.channel == 2));
    }

    #[test]
    fn polyphony_counts_overlapping_steps() {
        let phrase = Phrase::new(4.0)
            .chord(0.0, 2.0, &[60, 64, 67], 100)
            .chord(1.0, 1.0, &[72], 100)
            .chord(3.0, 1.0, &[48], 100);
        assert_eq!(phrase.max_polyphony(), 4);
    }

    #[test]
    fn demo_fits_the_default_pool() {
        let phrase = demo();
        assert!(phrase.max_polyphony() <= 16);
        assert!(phrase
            .steps
            .iter()
            .all(|s| s.beat + s.length <= phrase.beats));
    }
}
