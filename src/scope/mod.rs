//! Audio tap for visualisation.
//!
//! The render path owns a [`SnapshotWriter`] and pushes every block into it;
//! the UI owns the matching [`SnapshotReader`]. Nothing else is shared
//! between the two threads.

pub mod collector;
pub mod queue;

pub use collector::ScopeCollector;
pub use queue::{snapshot_queue, SnapshotReader, SnapshotWriter};
