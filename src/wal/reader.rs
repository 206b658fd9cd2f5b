//! Replay: reconstructs the in-memory map by streaming the log from the
//! beginning. Lenient by design — a torn or undecodable line marks the end
//! of trustworthy input, not a fatal error, since it is the expected shape
//! of a post-crash tail.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::Value;

use super::record::WalRecord;

pub struct WalReader;

impl WalReader {
    /// Replays `path` into an ordered vector of `(key, value-or-none)`
    /// operations applied in file order; `None` represents a delete. If the
    /// file doesn't exist, returns an empty result — there is nothing to
    /// replay on first open.
    ///
    /// Malformed lines (wrong field count, bad base64, bad JSON, or a final
    /// line with no trailing newline) are skipped, and replay stops at the
    /// first such line: everything after a torn append is untrustworthy.
    pub fn replay(path: impl AsRef<Path>) -> std::io::Result<Vec<(String, Option<Value>)>> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut reader = BufReader::new(file);
        let mut ops = Vec::new();
        loop {
            let mut line = String::new();
            let bytes_read = reader.read_line(&mut line)?;
            if bytes_read == 0 {
                break;
            }
            if !line.ends_with('\n') {
                // Trailing bytes with no terminating newline: a torn append.
                break;
            }
            let line = line.trim_end_matches('\n');
            match WalRecord::decode(line) {
                Some(WalRecord::Set { key, value }) => ops.push((key, Some(value))),
                Some(WalRecord::Delete { key }) => ops.push((key, None)),
                Some(WalRecord::BulkSet { items }) => {
                    for (key, value) in items {
                        ops.push((key, Some(value)));
                    }
                }
                None => break,
            }
        }
        Ok(ops)
    }
}
