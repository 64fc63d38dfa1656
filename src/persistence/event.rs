//! Records written to the command log.
//!
//! Each record is one JSON line: a sequence number, a timestamp, and the
//! command flattened into the same object.
//!
//! Commands whose effect depends on `QueueConfig` also record the setting
//! they were applied under, so replay reproduces what was acknowledged even
//! after the service configuration changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::commands::Command;
use crate::state::{QueueConfig, StaleEntryPolicy};

/// A command as recorded in the log.
///
/// Example JSON:
/// ```json
/// {"seq":4,"ts":"2024-01-15T10:00:00Z","type":"DISMISS_QUEUE_ENTRIES","trigger_kind":"LOGOUT"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedCommand {
    /// Monotonic sequence number. Used for replay positioning and ordering.
    pub seq: u64,

    /// When the command was recorded (UTC).
    pub ts: DateTime<Utc>,

    /// Stale entry policy in force when a prune was applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale_policy: Option<StaleEntryPolicy>,

    /// The command, flattened into the JSON object.
    #[serde(flatten)]
    pub command: Command,
}

impl LoggedCommand {
    /// Creates a record stamped with the current time.
    pub fn new(seq: u64, command: Command) -> Self {
        LoggedCommand {
            seq,
            ts: Utc::now(),
            stale_policy: None,
            command,
        }
    }

    /// Creates a record for a command applied under `config`.
    pub fn applied(seq: u64, command: Command, config: &QueueConfig) -> Self {
        let stale_policy = match command {
            Command::PruneStaleEntries { .. } => Some(config.stale_policy),
            _ => None,
        };
        LoggedCommand {
            stale_policy,
            ..LoggedCommand::new(seq, command)
        }
    }

    /// The config to replay this record under.
    ///
    /// Settings recorded with the command win over `current`.
    pub fn replay_config(&self, current: &QueueConfig) -> QueueConfig {
        match self.stale_policy {
            Some(policy) => current.with_stale_policy(policy),
            None => *current,
        }
    }

    /// Returns true if this record must be fsynced before it is acknowledged.
    ///
    /// Anything that changes the queue is critical; losing a queued retry or
    /// resurrecting a removed one breaks delivery guarantees. A lost
    /// connectivity flip is corrected by the next connectivity report.
    pub fn is_critical(&self) -> bool {
        !matches!(
            self.command,
            Command::ConnectivityChanged { .. } | Command::Unrecognized
        )
    }
}
