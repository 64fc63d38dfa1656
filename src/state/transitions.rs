//! Command dispatch for the queue state machine.
//!
//! `apply` maps each command onto its transition rule and returns the next
//! snapshot. The previous snapshot is never modified. Nothing here fails:
//! commands that do not qualify leave the state as it was.

use serde::{Deserialize, Serialize};

use super::admission::{RetryCandidate, admit_for_retry};
use super::pruning::{StaleEntryPolicy, prune_stale};
use super::removal::{dismiss, remove};
use crate::commands::Command;
use crate::types::QueueState;

/// Tunables for the transition rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// How pruning treats entries with no appointment id.
    #[serde(default)]
    pub stale_policy: StaleEntryPolicy,
}

impl QueueConfig {
    pub fn with_stale_policy(mut self, policy: StaleEntryPolicy) -> Self {
        self.stale_policy = policy;
        self
    }
}

/// Replaces the connectivity flag. The queue is untouched.
pub fn set_connected(state: &QueueState, connected: bool) -> QueueState {
    state.with_connected(connected)
}

/// Computes the next state for a command.
pub fn apply(state: &QueueState, command: &Command, config: &QueueConfig) -> QueueState {
    match command {
        Command::ConnectivityChanged { connected } => set_connected(state, *connected),

        Command::DeferForRetry {
            prev_action,
            prev_procedure,
            meta,
        } => {
            let candidate = RetryCandidate {
                prev_action: prev_action.clone(),
                prev_procedure: prev_procedure.clone(),
            };
            admit_for_retry(state, &candidate, meta)
        }

        Command::RemoveFromQueue { target } => remove(state, target),

        Command::DismissQueueEntries { trigger_kind } => dismiss(state, trigger_kind),

        Command::PruneStaleEntries { valid_ids } => prune_stale(state, valid_ids, config.stale_policy),

        Command::Unrecognized => state.clone(),
    }
}

/// Folds a sequence of commands over an initial state.
pub fn apply_all<'a>(
    state: &QueueState,
    commands: impl IntoIterator<Item = &'a Command>,
    config: &QueueConfig,
) -> QueueState {
    commands
        .into_iter()
        .fold(state.clone(), |acc, command| apply(&acc, command, config))
}
