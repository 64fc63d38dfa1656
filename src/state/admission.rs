//! Retry admission.
//!
//! The only rule that grows the queue. A candidate comes either as a plain
//! action that still needs the failing context's metadata attached, or as an
//! already materialized entry that carries its own metadata.

use serde::{Deserialize, Serialize};

use crate::types::{EntryMeta, PendingAction, QueueState, QueuedEntry};

/// What a failed operation offers for deferred retry.
///
/// When both forms are present the action wins for building the entry, even
/// if it was the procedure's own metadata that made the candidate eligible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryCandidate {
    /// The action form. Eligible when the triggering metadata asks for retry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_action: Option<PendingAction>,

    /// The procedure form. Eligible when its own metadata asks for retry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_procedure: Option<QueuedEntry>,
}

impl RetryCandidate {
    pub fn action(action: PendingAction) -> Self {
        RetryCandidate {
            prev_action: Some(action),
            prev_procedure: None,
        }
    }

    pub fn procedure(entry: QueuedEntry) -> Self {
        RetryCandidate {
            prev_action: None,
            prev_procedure: Some(entry),
        }
    }

    /// Whether this candidate may be queued, given the triggering metadata.
    pub fn is_eligible(&self, meta: &EntryMeta) -> bool {
        let action_retry = self.prev_action.is_some() && meta.wants_retry();
        let procedure_retry = self
            .prev_procedure
            .as_ref()
            .is_some_and(|p| p.meta.wants_retry());
        action_retry || procedure_retry
    }

    /// The entry that would be queued for this candidate, if any.
    pub fn canonical_entry(&self, meta: &EntryMeta) -> Option<QueuedEntry> {
        match (&self.prev_action, &self.prev_procedure) {
            (Some(action), _) => Some(action.clone().into_entry(meta.clone())),
            (None, Some(procedure)) => Some(procedure.clone()),
            (None, None) => None,
        }
    }
}

/// Admits a candidate for deferred retry.
///
/// Ineligible candidates leave the state unchanged. Otherwise:
/// 1. every structurally equal entry already queued is evicted,
/// 2. for `SYNC_APPOINTMENT`, every queued sync entry for the same
///    appointment id is evicted,
/// 3. the candidate's entry is appended at the tail.
///
/// Connectivity is never touched.
pub fn admit_for_retry(state: &QueueState, candidate: &RetryCandidate, meta: &EntryMeta) -> QueueState {
    if !candidate.is_eligible(meta) {
        return state.clone();
    }
    let Some(entry) = candidate.canonical_entry(meta) else {
        return state.clone();
    };

    let mut queue = state.queue.clone();

    queue.retain(|e| *e != entry);

    if entry.kind.is_sync_appointment() {
        queue.retain(|e| {
            !(e.kind.is_sync_appointment() && e.meta.appointment_id == entry.meta.appointment_id)
        });
    }

    queue.push(entry);
    state.with_queue(queue)
}
