//! Append-only command log with crash-safe replay.
//!
//! One JSON object per line. A crash mid-write leaves at most one partial
//! final line, which replay detects and truncates.
//!
//! # fsync Strategy
//!
//! - Critical records (anything that changes the queue): `sync_all()` right after the write
//! - Connectivity records: no fsync (the next sync or compaction covers them)

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::event::LoggedCommand;
use super::fsync::fsync_file;
use crate::commands::Command;
use crate::state::QueueConfig;

/// Errors that can occur during command log operations.
#[derive(Debug, Error)]
pub enum CommandLogError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for command log operations.
pub type Result<T> = std::result::Result<T, CommandLogError>;

/// An append-only log of applied commands.
pub struct CommandLog {
    /// The underlying file handle, opened for append.
    file: File,
    /// Path to the log file.
    path: PathBuf,
    /// Next sequence number to assign.
    next_seq: u64,
}

impl CommandLog {
    /// Opens or creates a log, continuing numbering from `next_seq`.
    ///
    /// Call `replay_from` first to learn `next_seq` for an existing log.
    pub fn open_with_seq(path: impl AsRef<Path>, next_seq: u64) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(&path)?;

        Ok(CommandLog {
            file,
            path,
            next_seq,
        })
    }

    /// Opens or creates a log with numbering starting at 0.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::open_with_seq(path, 0)
    }

    /// Appends a command, assigning the next sequence number.
    ///
    /// Critical records are fsynced before this returns.
    pub fn append(&mut self, command: Command) -> Result<LoggedCommand> {
        self.write(LoggedCommand::new(self.next_seq, command))
    }

    /// Appends a command together with the config it was applied under.
    pub fn append_applied(&mut self, command: Command, config: &QueueConfig) -> Result<LoggedCommand> {
        self.write(LoggedCommand::applied(self.next_seq, command, config))
    }

    fn write(&mut self, record: LoggedCommand) -> Result<LoggedCommand> {
        let json = serde_json::to_string(&record)?;
        writeln!(self.file, "{}", json)?;

        if record.is_critical() {
            fsync_file(&self.file)?;
        }

        self.next_seq += 1;
        Ok(record)
    }

    /// Forces fsync of the log file.
    pub fn sync(&self) -> io::Result<()> {
        fsync_file(&self.file)
    }

    /// Discards every record. Sequence numbering continues where it was.
    ///
    /// Only safe once a snapshot covering all records is durable.
    pub fn truncate(&mut self) -> io::Result<()> {
        self.file.set_len(0)?;
        fsync_file(&self.file)
    }

    /// Returns the current end of the log in bytes.
    pub fn position(&mut self) -> io::Result<u64> {
        self.file.seek(SeekFrom::End(0))
    }

    /// Returns the next sequence number that will be assigned.
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Returns the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replays records from a byte offset, truncating any partial line at EOF.
    ///
    /// Returns `(records, next_seq)` where `next_seq` is the highest sequence
    /// number seen plus one, or 0 if nothing was replayed. A missing or empty
    /// file yields `(vec![], 0)`.
    ///
    /// Reading stops at the first line that does not parse or whose sequence
    /// number does not increase; the file is cut back to the last good line.
    pub fn replay_from(path: impl AsRef<Path>, offset: u64) -> Result<(Vec<LoggedCommand>, u64)> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok((vec![], 0));
        }

        let file = File::open(path)?;
        let file_len = file.metadata()?.len();

        if offset >= file_len {
            return Ok((vec![], 0));
        }

        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(offset))?;

        let mut records = Vec::new();
        let mut last_valid_pos = offset;
        let mut current_pos = offset;
        let mut max_seq: Option<u64> = None;

        loop {
            let mut line = String::new();
            let bytes_read = reader.read_line(&mut line)?;
            if bytes_read == 0 {
                break;
            }

            let line_start = current_pos;
            current_pos += bytes_read as u64;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                last_valid_pos = current_pos;
                continue;
            }

            match serde_json::from_str::<LoggedCommand>(trimmed) {
                Ok(record) => {
                    if max_seq.is_some_and(|prev| record.seq <= prev) {
                        last_valid_pos = line_start;
                        break;
                    }
                    max_seq = Some(record.seq);
                    records.push(record);
                    last_valid_pos = current_pos;
                }
                Err(_) => {
                    last_valid_pos = line_start;
                    break;
                }
            }
        }

        if last_valid_pos < file_len {
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(last_valid_pos)?;
            fsync_file(&file)?;
        }

        let next_seq = max_seq.map(|s| s + 1).unwrap_or(0);
        Ok((records, next_seq))
    }
}
