//! Queue snapshot persistence.
//!
//! A snapshot captures the whole `QueueState` together with the sequence
//! number of the first command it does *not* include. Recovery loads the
//! snapshot and replays only later commands.
//!
//! # Atomic Writes
//!
//! 1. Write to `snapshot.json.tmp`
//! 2. fsync the file
//! 3. Rename to `snapshot.json`
//! 4. fsync the directory
//!
//! Readers see either the old or the new snapshot, never a partial one.

use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::fsync::{fsync_dir, fsync_file};
use crate::types::QueueState;

/// Current schema version. Increment when making breaking changes.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors that can occur during snapshot operations.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Schema version mismatch.
    #[error("schema version mismatch: expected {expected}, got {got}")]
    SchemaMismatch { expected: u32, got: u32 },
}

/// Result type for snapshot operations.
pub type Result<T> = std::result::Result<T, SnapshotError>;

/// Persisted queue snapshot, stored at `<state_dir>/snapshot.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedQueueSnapshot {
    /// Schema version for forward-compatible migrations.
    pub schema_version: u32,

    /// When this snapshot was written.
    pub snapshot_at: DateTime<Utc>,

    /// Sequence number of the first logged command not reflected in `state`.
    pub next_seq: u64,

    /// The queue state as of `next_seq`.
    pub state: QueueState,
}

impl PersistedQueueSnapshot {
    /// Creates a snapshot of `state` covering every command before `next_seq`.
    pub fn new(state: QueueState, next_seq: u64) -> Self {
        PersistedQueueSnapshot {
            schema_version: SCHEMA_VERSION,
            snapshot_at: Utc::now(),
            next_seq,
            state,
        }
    }
}

/// Saves a snapshot atomically to disk.
///
/// # Errors
///
/// Returns an error if any IO operation fails.
pub fn save_snapshot_atomic(path: &Path, snapshot: &PersistedQueueSnapshot) -> Result<()> {
    use std::fs::OpenOptions;
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(snapshot)?;

    {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;
        file.write_all(&bytes)?;
        fsync_file(&file)?;
    }

    std::fs::rename(&tmp_path, path)?;

    if let Some(parent) = path.parent() {
        fsync_dir(parent)?;
    }

    Ok(())
}

/// Loads a snapshot from disk.
///
/// # Errors
///
/// Returns an error if the file can't be read, the JSON is malformed, or
/// the schema version differs from `SCHEMA_VERSION`.
pub fn load_snapshot(path: &Path) -> Result<PersistedQueueSnapshot> {
    let bytes = std::fs::read(path)?;
    let snapshot: PersistedQueueSnapshot = serde_json::from_slice(&bytes)?;

    if snapshot.schema_version != SCHEMA_VERSION {
        return Err(SnapshotError::SchemaMismatch {
            expected: SCHEMA_VERSION,
            got: snapshot.schema_version,
        });
    }

    Ok(snapshot)
}

/// Attempts to load a snapshot, returning None if the file doesn't exist.
pub fn try_load_snapshot(path: &Path) -> Result<Option<PersistedQueueSnapshot>> {
    match load_snapshot(path) {
        Ok(snapshot) => Ok(Some(snapshot)),
        Err(SnapshotError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
