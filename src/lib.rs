//! wardkv - a durable, replicated key-value store.
//!
//! The core is a write-ahead log with synchronous fsync discipline, an
//! in-memory map that mirrors it, and a replay procedure that reconstructs
//! state after restart ([`wal`], [`engine`]). A thin replication layer adds
//! primary/secondary roles and best-effort peer fanout ([`replication`]),
//! with a process-external helper to discover or promote a primary
//! ([`cluster`]). An optional full-text/similarity index sits alongside the
//! map ([`index`]). [`http`] is the network dispatcher; [`cli`] is the
//! flags surface.

pub mod cli;
pub mod cluster;
pub mod engine;
pub mod error;
pub mod http;
pub mod index;
pub mod replication;
pub mod wal;
