//! fsync helpers.
//!
//! A file rename or creation is only durable once the containing directory
//! has been synced as well as the file itself.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

/// Flushes a file's data and metadata to disk.
pub fn fsync_file(file: &File) -> io::Result<()> {
    file.sync_all()
}

/// Flushes a directory's entries to disk.
///
/// Call after creating, renaming or truncating-by-replacement a file inside
/// `dir_path`. Only pass directories.
pub fn fsync_dir(dir_path: &Path) -> io::Result<()> {
    OpenOptions::new().read(true).open(dir_path)?.sync_all()
}
