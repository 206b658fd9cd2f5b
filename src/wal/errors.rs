//! WAL error types.
//!
//! Error kinds:
//! - `AppendFailed` (write to the log file failed)
//! - `FsyncFailed` (the append survived `write_all` but the fsync failed)

use std::fmt;
use std::io;

/// Severity levels for WAL errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, the caller's state is unchanged.
    Error,
    /// The log handle is no longer trustworthy; the engine should stop serving writes.
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalErrorKind {
    AppendFailed,
    FsyncFailed,
}

impl WalErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            WalErrorKind::AppendFailed => "WAL_APPEND_FAILED",
            WalErrorKind::FsyncFailed => "WAL_FSYNC_FAILED",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            WalErrorKind::AppendFailed => Severity::Error,
            WalErrorKind::FsyncFailed => Severity::Fatal,
        }
    }
}

impl fmt::Display for WalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A WAL-layer failure. Never constructed for replay (replay is lenient by
/// design and never errors — see `WalReader::replay`); this type only covers
/// the write path, where a failure must prevent the in-memory apply.
#[derive(Debug)]
pub struct WalError {
    kind: WalErrorKind,
    message: String,
    source: Option<io::Error>,
}

impl WalError {
    pub fn append_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            kind: WalErrorKind::AppendFailed,
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn fsync_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            kind: WalErrorKind::FsyncFailed,
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn kind(&self) -> WalErrorKind {
        self.kind
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for WalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind.severity(), self.kind.code(), self.message)
    }
}

impl std::error::Error for WalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

pub type WalResult<T> = Result<T, WalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fsync_failure_is_fatal() {
        let err = WalError::fsync_failed("fsync failed", io::Error::new(io::ErrorKind::Other, "disk error"));
        assert!(err.is_fatal());
    }

    #[test]
    fn append_failure_is_not_fatal() {
        let err = WalError::append_failed("write failed", io::Error::new(io::ErrorKind::Other, "disk full"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn display_contains_code_and_severity() {
        let err = WalError::fsync_failed("disk gone", io::Error::new(io::ErrorKind::Other, "oops"));
        let display = format!("{err}");
        assert!(display.contains("WAL_FSYNC_FAILED"));
        assert!(display.contains("FATAL"));
    }
}
