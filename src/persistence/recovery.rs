//! Startup recovery and compaction.
//!
//! # Recovery
//!
//! 1. Load `snapshot.json` (or start from the initial state)
//! 2. Replay `commands.log`, skipping records the snapshot already covers.
//!    Each record is applied under the settings it was logged with.
//! 3. Validate queue invariants on the result
//!
//! # Compaction
//!
//! Write a snapshot whose `next_seq` is the log's next sequence number, then
//! truncate the log. A crash between the two steps is harmless: replay skips
//! every record with `seq < next_seq`.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::log::{CommandLog, CommandLogError};
use super::snapshot::{PersistedQueueSnapshot, SnapshotError, save_snapshot_atomic, try_load_snapshot};
use crate::state::{QueueConfig, QueueInvariantError, apply, validate_queue};
use crate::types::QueueState;

/// Snapshot file name inside the state directory.
pub const SNAPSHOT_FILE: &str = "snapshot.json";

/// Command log file name inside the state directory.
pub const LOG_FILE: &str = "commands.log";

/// Errors that can occur while recovering or compacting.
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("command log error: {0}")]
    Log(#[from] CommandLogError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The recovered queue violates an invariant.
    #[error("recovered queue is inconsistent: {0}")]
    Inconsistent(#[from] QueueInvariantError),
}

/// Result type for recovery operations.
pub type Result<T> = std::result::Result<T, RecoveryError>;

pub fn snapshot_path(state_dir: &Path) -> PathBuf {
    state_dir.join(SNAPSHOT_FILE)
}

pub fn log_path(state_dir: &Path) -> PathBuf {
    state_dir.join(LOG_FILE)
}

/// The outcome of recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovered {
    /// The reconstructed state.
    pub state: QueueState,
    /// Next sequence number for the command log.
    pub next_seq: u64,
    /// Number of log records applied on top of the snapshot.
    pub replayed: usize,
}

/// Rebuilds the queue state from `state_dir`.
///
/// A missing directory, snapshot or log all count as empty.
pub fn recover(state_dir: &Path, config: &QueueConfig) -> Result<Recovered> {
    let snapshot = try_load_snapshot(&snapshot_path(state_dir))?;
    let (mut state, snapshot_seq) = match snapshot {
        Some(snapshot) => {
            validate_queue(&snapshot.state)?;
            (snapshot.state, snapshot.next_seq)
        }
        None => (QueueState::initial(), 0),
    };

    let (records, log_seq) = CommandLog::replay_from(log_path(state_dir), 0)?;

    let mut replayed = 0;
    for record in records.iter().filter(|r| r.seq >= snapshot_seq) {
        state = apply(&state, &record.command, &record.replay_config(config));
        replayed += 1;
    }

    validate_queue(&state)?;

    Ok(Recovered {
        state,
        next_seq: snapshot_seq.max(log_seq),
        replayed,
    })
}

/// Snapshots `state` and empties `log`.
///
/// `state` must reflect every record in `log`.
pub fn compact(state_dir: &Path, state: &QueueState, log: &mut CommandLog) -> Result<()> {
    log.sync()?;
    let snapshot = PersistedQueueSnapshot::new(state.clone(), log.next_seq());
    save_snapshot_atomic(&snapshot_path(state_dir), &snapshot)?;
    log.truncate()?;
    Ok(())
}
