//! Pure state logic for the offline queue.
//!
//! This module is the functional core: every transition takes a snapshot and
//! returns a new one, with no I/O, no logging and no failure outcomes.
//! Persistence and serving happen elsewhere.

pub mod admission;
pub mod equality;
pub mod pruning;
pub mod removal;
pub mod transitions;
pub mod validation;

// Re-export commonly used types and functions
pub use admission::{RetryCandidate, admit_for_retry};
pub use equality::same_entry;
pub use pruning::{StaleEntryPolicy, prune_stale};
pub use removal::{dismiss, remove};
pub use transitions::{QueueConfig, apply, apply_all, set_connected};
pub use validation::{QueueInvariantError, validate_queue};
