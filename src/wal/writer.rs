//! Append-only, fsync-on-every-record writer.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::errors::{WalError, WalResult};
use super::record::WalRecord;

pub struct WalWriter {
    path: PathBuf,
    file: File,
}

impl WalWriter {
    /// Opens the log file for append, creating it and its parent directory
    /// if missing. Holds the file handle for the lifetime of the engine.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(WalWriter { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes one record plus a trailing newline, flushes, and fsyncs the
    /// file descriptor. Returns only after the fsync completes; a failure at
    /// either step must prevent the caller from applying the in-memory
    /// change.
    pub fn append(&mut self, record: &WalRecord) -> WalResult<()> {
        let mut line = record.encode();
        line.push('\n');
        self.file
            .write_all(line.as_bytes())
            .map_err(|e| WalError::append_failed(format!("failed to append to {}", self.path.display()), e))?;
        self.file
            .sync_all()
            .map_err(|e| WalError::fsync_failed(format!("failed to fsync {}", self.path.display()), e))?;
        Ok(())
    }

    /// Flushes and closes the handle. Idempotent: calling this more than
    /// once, or dropping the writer afterward, never panics.
    pub fn close(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
