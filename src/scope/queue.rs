//! Overwriting single-producer/single-consumer sample queue.
//!
//! The audio thread pushes every rendered block; the UI thread pulls whatever
//! it has time for. Unlike a regular SPSC ring the writer never waits for the
//! reader: once the reader falls more than `capacity` samples behind, the
//! oldest unread samples are simply overwritten.
//!
//! # Cursors
//!
//! Positions are monotonic sample counts (wrapping `usize`), mapped onto the
//! slots modulo `capacity`.
//!
//! ```text
//!   claimed   position up to which the writer may be touching slots
//!   written   position up to which slots are complete and readable
//! ```
//!
//! The writer bumps `claimed`, writes slots, then publishes `written`. The
//! reader copies from `max(read, written - capacity)` and afterwards checks
//! `claimed`: any copied position the writer may have lapped in the meantime
//! (`pos < claimed - capacity`) is discarded. Slots are `AtomicU32` holding
//! f32 bits, so a racing overwrite is a stale value, never undefined
//! behaviour, and the cursor check ensures stale values are never returned.

use std::sync::{
    atomic::{fence, AtomicU32, AtomicUsize, Ordering},
    Arc,
};

struct Shared {
    slots: Box<[AtomicU32]>,
    claimed: AtomicUsize,
    written: AtomicUsize,
}

impl Shared {
    #[inline]
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn slot(&self, position: usize) -> &AtomicU32 {
        &self.slots[position % self.slots.len()]
    }
}

/// Create a queue holding the latest `capacity` samples (at least one).
pub fn snapshot_queue(capacity: usize) -> (SnapshotWriter, SnapshotReader) {
    let capacity = capacity.max(1);
    let slots = (0..capacity)
        .map(|_| AtomicU32::new(0.0f32.to_bits()))
        .collect::<Vec<_>>()
        .into_boxed_slice();

    let shared = Arc::new(Shared {
        slots,
        claimed: AtomicUsize::new(0),
        written: AtomicUsize::new(0),
    });

    let writer = SnapshotWriter {
        shared: Arc::clone(&shared),
        position: 0,
    };
    let reader = SnapshotReader {
        shared,
        position: 0,
    };

    (writer, reader)
}

/// Producer half, owned by the audio thread.
pub struct SnapshotWriter {
    shared: Arc<Shared>,
    position: usize,
}

impl SnapshotWriter {
    /// Append samples without blocking. When `samples` is longer than the
    /// queue only its tail is stored; unread data is overwritten as needed.
    pub fn push(&mut self, samples: &[f32]) {
        if samples.is_empty() {
            return;
        }

        let capacity = self.shared.capacity();
        let skipped = samples.len().saturating_sub(capacity);
        let tail = &samples[skipped..];

        let start = self.position.wrapping_add(skipped);
        let end = start.wrapping_add(tail.len());

        self.shared.claimed.store(end, Ordering::Relaxed);
        fence(Ordering::Release);

        for (i, &sample) in tail.iter().enumerate() {
            self.shared
                .slot(start.wrapping_add(i))
                .store(sample.to_bits(), Ordering::Relaxed);
        }

        self.shared.written.store(end, Ordering::Release);
        self.position = end;
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }

    /// Total samples pushed so far (wrapping).
    pub fn total_written(&self) -> usize {
        self.position
    }
}

/// Consumer half, owned by the UI thread.
pub struct SnapshotReader {
    shared: Arc<Shared>,
    position: usize,
}

impl SnapshotReader {
    /// Consume up to `dest.len()` of the oldest samples still held, in order.
    ///
    /// Returns how many were copied; fewer than requested when the writer has
    /// not produced enough yet. Samples older than the last `capacity` pushed
    /// are skipped.
    pub fn pop(&mut self, dest: &mut [f32]) -> usize {
        let written = self.shared.written.load(Ordering::Acquire);
        let oldest = written.wrapping_sub(self.shared.capacity());
        if written.wrapping_sub(self.position) > self.shared.capacity() {
            self.position = oldest;
        }

        let available = written.wrapping_sub(self.position);
        let count = available.min(dest.len());
        let start = self.position;

        let (valid_from, copied) = self.copy_validated(start, &mut dest[..count]);
        if valid_from > 0 {
            // Lapped while copying: shift the surviving samples to the front
            dest.copy_within(valid_from..count, 0);
        }

        self.position = start.wrapping_add(count);
        copied
    }

    /// Copy the most recent `dest.len()` samples (or as many as exist)
    /// without consuming them. The newest sample lands in the last returned
    /// slot.
    pub fn snapshot(&self, dest: &mut [f32]) -> usize {
        let written = self.shared.written.load(Ordering::Acquire);
        let held = written.min(self.shared.capacity());
        let count = held.min(dest.len());
        let start = written.wrapping_sub(count);

        let (valid_from, copied) = self.copy_validated(start, &mut dest[..count]);
        if valid_from > 0 {
            dest.copy_within(valid_from..count, 0);
        }
        copied
    }

    /// Copy `dest.len()` samples starting at `start`, then work out how many
    /// leading samples may have been overwritten during the copy. Returns the
    /// index of the first trustworthy sample and the number of trustworthy
    /// samples.
    fn copy_validated(&self, start: usize, dest: &mut [f32]) -> (usize, usize) {
        for (i, sample) in dest.iter_mut().enumerate() {
            let bits = self.shared.slot(start.wrapping_add(i)).load(Ordering::Relaxed);
            *sample = f32::from_bits(bits);
        }

        fence(Ordering::Acquire);
        let claimed = self.shared.claimed.load(Ordering::Relaxed);
        let safe_from = claimed.wrapping_sub(self.shared.capacity());

        // Positions before `safe_from` may hold newer data than we asked for
        let lapped = safe_from.wrapping_sub(start) as isize;
        let valid_from = if lapped <= 0 {
            0
        } else {
            (lapped as usize).min(dest.len())
        };

        (valid_from, dest.len() - valid_from)
    }

    /// Unread samples currently held (at most `capacity`).
    pub fn available(&self) -> usize {
        let written = self.shared.written.load(Ordering::Acquire);
        written
            .wrapping_sub(self.position)
            .min(self.shared.capacity())
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn pop_returns_pushed_samples_in_order() {
        let (mut tx, mut rx) = snapshot_queue(8);
        tx.push(&[1.0, 2.0, 3.0]);

        let mut dest = [0.0; 8];
        assert_eq!(rx.pop(&mut dest), 3);
        assert_eq!(&dest[..3], &[1.0, 2.0, 3.0]);
        assert_eq!(rx.pop(&mut dest), 0);
    }

    #[test]
    fn overflow_keeps_most_recent_capacity() {
        let capacity = 8;
        let (mut tx, mut rx) = snapshot_queue(capacity);
        let input: Vec<f32> = (1..=2 * capacity).map(|i| i as f32).collect();
        for chunk in input.chunks(3) {
            tx.push(chunk);
        }

        let mut dest = vec![0.0; capacity];
        assert_eq!(rx.pop(&mut dest), capacity);
        let expected: Vec<f32> = (capacity + 1..=2 * capacity).map(|i| i as f32).collect();
        assert_eq!(dest, expected);
    }

    #[test]
    fn oversized_push_keeps_tail() {
        let (mut tx, mut rx) = snapshot_queue(4);
        tx.push(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let mut dest = [0.0; 4];
        assert_eq!(rx.pop(&mut dest), 4);
        assert_eq!(dest, [3.0, 4.0, 5.0, 6.0]);
        assert_eq!(tx.total_written(), 6);
    }

    #[test]
    fn partial_pop_resumes_where_it_left_off() {
        let (mut tx, mut rx) = snapshot_queue(8);
        tx.push(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        let mut dest = [0.0; 2];
        assert_eq!(rx.pop(&mut dest), 2);
        assert_eq!(dest, [1.0, 2.0]);
        assert_eq!(rx.available(), 3);
        assert_eq!(rx.pop(&mut dest), 2);
        assert_eq!(dest, [3.0, 4.0]);
    }

    #[test]
    fn snapshot_reads_latest_without_consuming() {
        let (mut tx, rx) = snapshot_queue(8);
        tx.push(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        let mut dest = [0.0; 3];
        assert_eq!(rx.snapshot(&mut dest), 3);
        assert_eq!(dest, [3.0, 4.0, 5.0]);
        assert_eq!(rx.available(), 5);

        let mut wide = [0.0; 16];
        assert_eq!(rx.snapshot(&mut wide), 5);
        assert_eq!(&wide[..5], &[1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn zero_capacity_is_bumped_to_one() {
        let (mut tx, mut rx) = snapshot_queue(0);
        tx.push(&[1.0, 2.0]);
        let mut dest = [0.0; 4];
        assert_eq!(rx.pop(&mut dest), 1);
        assert_eq!(dest[0], 2.0);
    }

    #[test]
    fn concurrent_reader_sees_increasing_sequence() {
        let (mut tx, mut rx) = snapshot_queue(256);

        let producer = thread::spawn(move || {
            let mut block = [0.0f32; 64];
            let mut next = 0u32;
            for _ in 0..2_000 {
                for sample in block.iter_mut() {
                    next += 1;
                    *sample = next as f32;
                }
                tx.push(&block);
            }
        });

        let mut dest = [0.0f32; 128];
        let mut last = 0.0f32;
        while !producer.is_finished() {
            let n = rx.pop(&mut dest);
            for &sample in &dest[..n] {
                assert!(sample > last, "queue returned {sample} after {last}");
                last = sample;
            }
        }

        producer.join().unwrap();
    }
}
