//! Replication errors are internal-only: a peer-fanout failure is logged and
//! swallowed, never surfaced to the client that made the original request.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicationErrorKind {
    PeerUnreachable,
    PeerTimedOut,
    PeerRejected,
}

#[derive(Debug, Clone)]
pub struct ReplicationError {
    pub kind: ReplicationErrorKind,
    pub message: String,
}

impl ReplicationError {
    pub fn unreachable(peer: &str) -> Self {
        ReplicationError {
            kind: ReplicationErrorKind::PeerUnreachable,
            message: format!("peer {peer} unreachable"),
        }
    }

    pub fn timed_out(peer: &str) -> Self {
        ReplicationError {
            kind: ReplicationErrorKind::PeerTimedOut,
            message: format!("peer {peer} timed out"),
        }
    }

    pub fn rejected(peer: &str, status: u16) -> Self {
        ReplicationError {
            kind: ReplicationErrorKind::PeerRejected,
            message: format!("peer {peer} rejected replication with status {status}"),
        }
    }
}

impl fmt::Display for ReplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ReplicationError {}
