//! Top-level error taxonomy.
//!
//! Mirrors the per-subsystem `{Code}ErrorKind` / `{Code}Error` pattern used
//! throughout this codebase (see `wal::errors`, `replication::errors`), but
//! collapsed to the four client-visible kinds plus the internal-only
//! replication-loss case that never crosses the HTTP boundary.

use std::fmt;

use crate::wal::WalError;

/// Errors that can be returned from a client-facing store operation.
#[derive(Debug)]
pub enum StoreError {
    /// The WAL append or its fsync failed before any in-memory change was made.
    Durability(String),
    /// A mutation was attempted on a node whose role is not primary.
    NotPrimary,
    /// The request body or query string was missing a required field.
    Malformed(String),
    /// `get` found no value for the key. Not an exceptional condition.
    NotFound,
}

impl StoreError {
    pub fn durability<S: Into<String>>(message: S) -> Self {
        StoreError::Durability(message.into())
    }

    pub fn malformed<S: Into<String>>(message: S) -> Self {
        StoreError::Malformed(message.into())
    }

    /// HTTP status code this error maps to on the wire.
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::Durability(_) => 500,
            StoreError::NotPrimary => 503,
            StoreError::Malformed(_) => 400,
            StoreError::NotFound => 404,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::Durability(_))
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Durability(msg) => write!(f, "durability error: {msg}"),
            StoreError::NotPrimary => write!(f, "not primary"),
            StoreError::Malformed(msg) => write!(f, "malformed request: {msg}"),
            StoreError::NotFound => write!(f, "not found"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<WalError> for StoreError {
    fn from(err: WalError) -> Self {
        let code = err.kind().code();
        StoreError::Durability(format!("[{code}] {err}"))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
