//! Staleness pruning.
//!
//! When the external list of appointments changes, entries referring to an
//! appointment that no longer exists are dropped.
//!
//! # Entries without an appointment
//!
//! | Policy | Entry with no `appointment_id` |
//! |--------|--------------------------------|
//! | `DropUnscoped` (default) | Dropped: absence fails the membership test |
//! | `KeepUnscoped` | Kept: treated as not appointment-scoped |

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{AppointmentId, QueueState};

/// What pruning does with entries that carry no appointment id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleEntryPolicy {
    /// Drop them. Matches the long-standing client behaviour.
    #[default]
    DropUnscoped,
    /// Keep them; only appointment-scoped entries are pruned.
    KeepUnscoped,
}

/// Keeps only entries whose appointment id is in `valid_ids`.
///
/// The result is always an order-preserving subsequence of the input queue.
pub fn prune_stale(state: &QueueState, valid_ids: &[AppointmentId], policy: StaleEntryPolicy) -> QueueState {
    let valid: HashSet<AppointmentId> = valid_ids.iter().cloned().collect();

    let queue = state
        .queue
        .iter()
        .filter(|e| match &e.meta.appointment_id {
            Some(id) => valid.contains(id),
            None => policy == StaleEntryPolicy::KeepUnscoped,
        })
        .cloned()
        .collect();

    state.with_queue(queue)
}
