//! Queue invariant checks.
//!
//! The transition rules keep these invariants by construction. Validation is
//! for state that arrives from elsewhere, such as a snapshot on disk.

use std::collections::HashMap;

use thiserror::Error;

use crate::types::{AppointmentId, QueueState};

/// A queue invariant that does not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueInvariantError {
    /// Two entries are structurally equal.
    #[error("entries at positions {first} and {second} are structurally equal")]
    DuplicateEntry { first: usize, second: usize },

    /// More than one `SYNC_APPOINTMENT` entry for the same appointment.
    #[error("multiple SYNC_APPOINTMENT entries for {appointment:?} at positions {first} and {second}")]
    DuplicateSync {
        appointment: Option<AppointmentId>,
        first: usize,
        second: usize,
    },
}

/// Checks that no two entries are structurally equal and that there is at
/// most one `SYNC_APPOINTMENT` entry per appointment id.
///
/// Reports the first violation found, scanning in queue order.
pub fn validate_queue(state: &QueueState) -> Result<(), QueueInvariantError> {
    let mut sync_seen: HashMap<Option<AppointmentId>, usize> = HashMap::new();

    for (second, entry) in state.queue.iter().enumerate() {
        if let Some(first) = state.queue[..second].iter().position(|e| e == entry) {
            return Err(QueueInvariantError::DuplicateEntry { first, second });
        }

        if entry.kind.is_sync_appointment() {
            let appointment = entry.meta.appointment_id.clone();
            if let Some(&first) = sync_seen.get(&appointment) {
                return Err(QueueInvariantError::DuplicateSync {
                    appointment,
                    first,
                    second,
                });
            }
            sync_seen.insert(appointment, second);
        }
    }

    Ok(())
}
