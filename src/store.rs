//! The single mutable slot holding the current queue state.
//!
//! `QueueStore` owns the current snapshot and the command log. Every command
//! goes through `submit`, which computes the next state with the pure core,
//! records the command durably, and only then replaces the slot. Callers are
//! expected to serialize access (one writer at a time).
//!
//! Compaction is housekeeping. Once a command is in the log it has been
//! applied, so a failed compaction is logged and retried after another
//! `compact_after` commands instead of being reported to the caller.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::commands::Command;
use crate::persistence::log::{CommandLog, CommandLogError};
use crate::persistence::recovery::{self, RecoveryError};
use crate::state::{QueueConfig, apply};
use crate::types::QueueState;

/// Default number of logged commands between compactions.
pub const DEFAULT_COMPACT_AFTER: u64 = 1000;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("recovery failed: {0}")]
    Recovery(#[from] RecoveryError),

    #[error("command log error: {0}")]
    Log(#[from] CommandLogError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

pub struct QueueStore {
    state_dir: PathBuf,
    config: QueueConfig,
    compact_after: u64,
    state: QueueState,
    log: CommandLog,
    since_compaction: u64,
}

impl QueueStore {
    /// Opens the store in `state_dir`, recovering any persisted state.
    ///
    /// The directory is created if it does not exist.
    pub fn open(state_dir: impl Into<PathBuf>, config: QueueConfig, compact_after: u64) -> Result<Self> {
        let state_dir = state_dir.into();
        std::fs::create_dir_all(&state_dir)?;

        let recovered = recovery::recover(&state_dir, &config)?;
        let log = CommandLog::open_with_seq(recovery::log_path(&state_dir), recovered.next_seq)?;

        info!(
            state_dir = %state_dir.display(),
            entries = recovered.state.len(),
            connected = recovered.state.connected,
            replayed = recovered.replayed,
            next_seq = recovered.next_seq,
            "Recovered queue state"
        );

        Ok(QueueStore {
            state_dir,
            config,
            compact_after: compact_after.max(1),
            since_compaction: recovered.replayed as u64,
            state: recovered.state,
            log,
        })
    }

    /// The current snapshot.
    pub fn state(&self) -> &QueueState {
        &self.state
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Applies a command and returns the resulting snapshot.
    ///
    /// Commands that leave the state unchanged are not logged. If logging
    /// fails the current state is kept and the error returned. Any error
    /// means the command was not applied.
    #[instrument(skip(self, command), fields(command = command.name()))]
    pub fn submit(&mut self, command: Command) -> Result<QueueState> {
        let next = apply(&self.state, &command, &self.config);

        if next == self.state {
            debug!(entries = self.state.len(), "Command left state unchanged");
            return Ok(next);
        }

        let record = self.log.append_applied(command, &self.config)?;
        debug!(
            seq = record.seq,
            before = self.state.len(),
            after = next.len(),
            connected = next.connected,
            "Applied command"
        );
        self.state = next;
        self.since_compaction += 1;

        if self.since_compaction >= self.compact_after {
            if let Err(e) = self.compact() {
                warn!(
                    error = %e,
                    retry_after = self.compact_after,
                    "Compaction failed; command log keeps growing"
                );
                self.since_compaction = 0;
            }
        }

        Ok(self.state.clone())
    }

    /// Writes a snapshot of the current state and truncates the log.
    #[instrument(skip(self))]
    pub fn compact(&mut self) -> Result<()> {
        recovery::compact(&self.state_dir, &self.state, &mut self.log)?;
        info!(
            next_seq = self.log.next_seq(),
            entries = self.state.len(),
            "Compacted command log"
        );
        self.since_compaction = 0;
        Ok(())
    }
}
