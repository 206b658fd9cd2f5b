//! Write-ahead log: append-and-fsync record writer and a crash-tolerant
//! replayer that rebuilds the in-memory map from a log file.
//!
//! # Design principles
//!
//! - Durability over throughput: no acknowledged write exists unless it is
//!   fully persisted, fsynced, in the log.
//! - Simplicity over cleverness: no header, no checksum, no length prefix.
//!   A torn trailing record is detected purely by the absence of a newline.
//!
//! # Invariants enforced
//!
//! - Durability: a record is on stable storage before `append` returns.
//! - Monotone append: the log grows only by append; nothing is rewritten.
//! - Replay order: replay reproduces file order, including pair order inside
//!   a `BULK_SET` payload.
//! - Torn-tail tolerance: a record that fails to decode, or a line without a
//!   terminating newline, is silently dropped and replay stops there — bytes
//!   after a torn append cannot be trusted to be newline-aligned.

mod errors;
mod reader;
mod record;
mod writer;

pub use errors::{WalError, WalResult};
pub use reader::WalReader;
pub use record::WalRecord;
pub use writer::WalWriter;
