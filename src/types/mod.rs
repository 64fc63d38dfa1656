//! Core domain types for the offline queue.
//!
//! Entries, their metadata, and the queue state snapshot. Everything here is
//! plain data; the rules that move between snapshots live in `state`.

pub mod entry;
pub mod ids;
pub mod queue;

pub use entry::{EntryMeta, Payload, PendingAction, QueuedEntry};
pub use ids::{AppointmentId, EntryKind, SYNC_APPOINTMENT};
pub use queue::QueueState;
