//! Persistence for the offline queue.
//!
//! The queue core holds no durable storage. This module wraps it with a
//! command log and snapshots so a restarted process comes back with the same
//! queue.
//!
//! # Architecture
//!
//! - **Command log**: Append-only JSON Lines of applied commands
//! - **Snapshots**: Full `QueueState` captures for fast recovery
//! - **Compaction**: Snapshot, then truncate the log
//!
//! # File Layout
//!
//! ```text
//! <state_dir>/
//!   snapshot.json   # PersistedQueueSnapshot
//!   commands.log    # LoggedCommand per line
//! ```
//!
//! # Crash Safety
//!
//! - Command log: Partial writes detected and truncated on replay
//! - Snapshots: Written atomically using write-to-temp-then-rename
//! - Compaction: Records already covered by the snapshot are skipped on replay

pub mod event;
pub mod fsync;
pub mod log;
pub mod recovery;
pub mod snapshot;

pub use event::LoggedCommand;
pub use fsync::{fsync_dir, fsync_file};
pub use log::{CommandLog, CommandLogError};
pub use recovery::{Recovered, RecoveryError, compact, log_path, recover, snapshot_path};
pub use snapshot::{
    PersistedQueueSnapshot, SCHEMA_VERSION, SnapshotError, load_snapshot, save_snapshot_atomic,
    try_load_snapshot,
};
