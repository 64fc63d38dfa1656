//! Command types consumed by the queue.
//!
//! Each command selects one transition rule. Commands arrive as JSON objects
//! tagged by `type`.

use serde::{Deserialize, Serialize};

use crate::types::{AppointmentId, EntryMeta, PendingAction, QueuedEntry};

/// A command submitted by the external dispatcher.
///
/// Serialized with internal tagging: `{"type": "DISMISS_QUEUE_ENTRIES", "trigger_kind": "LOGOUT"}`.
/// Unknown `type` values deserialize to `Unrecognized`, which leaves the state unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    /// Connectivity flag changed.
    #[serde(rename = "CONNECTIVITY_CHANGED")]
    ConnectivityChanged { connected: bool },

    /// An operation failed and may be deferred for retry.
    ///
    /// `prev_action` is the bare operation that gets `meta` attached;
    /// `prev_procedure` is an entry that already carries its own metadata.
    #[serde(rename = "DEFER_FOR_RETRY")]
    DeferForRetry {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prev_action: Option<PendingAction>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prev_procedure: Option<QueuedEntry>,
        #[serde(default)]
        meta: EntryMeta,
    },

    /// A deferred operation completed out-of-band.
    #[serde(rename = "REMOVE_FROM_QUEUE")]
    RemoveFromQueue { target: QueuedEntry },

    /// An event fired that cancels a class of queued retries.
    #[serde(rename = "DISMISS_QUEUE_ENTRIES")]
    DismissQueueEntries { trigger_kind: String },

    /// The external appointment list changed.
    #[serde(rename = "PRUNE_STALE_ENTRIES")]
    PruneStaleEntries { valid_ids: Vec<AppointmentId> },

    /// Any command kind this queue does not handle.
    #[serde(other)]
    Unrecognized,
}

impl Command {
    /// Wire name of the command, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Command::ConnectivityChanged { .. } => "CONNECTIVITY_CHANGED",
            Command::DeferForRetry { .. } => "DEFER_FOR_RETRY",
            Command::RemoveFromQueue { .. } => "REMOVE_FROM_QUEUE",
            Command::DismissQueueEntries { .. } => "DISMISS_QUEUE_ENTRIES",
            Command::PruneStaleEntries { .. } => "PRUNE_STALE_ENTRIES",
            Command::Unrecognized => "UNRECOGNIZED",
        }
    }

    /// Defers a bare action, attaching `meta` on admission.
    pub fn defer_action(action: PendingAction, meta: EntryMeta) -> Self {
        Command::DeferForRetry {
            prev_action: Some(action),
            prev_procedure: None,
            meta,
        }
    }

    /// Defers an entry that already carries its own metadata.
    pub fn defer_procedure(entry: QueuedEntry) -> Self {
        Command::DeferForRetry {
            prev_action: None,
            prev_procedure: Some(entry),
            meta: EntryMeta::default(),
        }
    }

    /// True for commands that can only shrink the queue or leave it alone.
    pub fn is_shrinking(&self) -> bool {
        !matches!(self, Command::DeferForRetry { .. })
    }
}
