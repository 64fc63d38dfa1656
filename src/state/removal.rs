//! Removal rules: exact removal of a completed entry, and bulk dismissal by
//! trigger kind. Both only ever shrink the queue.

use crate::types::{QueueState, QueuedEntry};

/// Removes the first queued entry structurally equal to `target`.
///
/// Used when a deferred operation has completed out-of-band. No-op if nothing
/// matches. `SYNC_APPOINTMENT` entries get no special treatment here.
pub fn remove(state: &QueueState, target: &QueuedEntry) -> QueueState {
    match state.position_of(target) {
        Some(index) => {
            let mut queue = state.queue.clone();
            queue.remove(index);
            state.with_queue(queue)
        }
        None => state.clone(),
    }
}

/// Removes every entry whose dismiss list contains `trigger_kind`.
pub fn dismiss(state: &QueueState, trigger_kind: &str) -> QueueState {
    let queue = state
        .queue
        .iter()
        .filter(|e| !e.meta.is_dismissed_by(trigger_kind))
        .cloned()
        .collect();
    state.with_queue(queue)
}
