//! WAL record grammar: `OP \t FIELD (\t FIELD)* \n`, `OP in {SET, DEL, BULK_SET}`.
//!
//! Values and bulk payloads are base64(JSON-UTF-8). Keys are literal text and
//! must not contain a tab or newline — base64 guarantees the encoded fields
//! never do, so a record line is safe to split on tabs.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum WalRecord {
    Set { key: String, value: Value },
    Delete { key: String },
    BulkSet { items: Vec<(String, Value)> },
}

impl WalRecord {
    /// Render this record as the exact line written to the log, without the
    /// trailing newline (the writer appends that separately).
    pub fn encode(&self) -> String {
        match self {
            WalRecord::Set { key, value } => {
                let encoded = STANDARD.encode(value.to_string());
                format!("SET\t{key}\t{encoded}")
            }
            WalRecord::Delete { key } => format!("DEL\t{key}"),
            WalRecord::BulkSet { items } => {
                let pairs: Vec<Value> = items
                    .iter()
                    .map(|(k, v)| Value::Array(vec![Value::String(k.clone()), v.clone()]))
                    .collect();
                let encoded = STANDARD.encode(Value::Array(pairs).to_string());
                format!("BULK_SET\t{encoded}")
            }
        }
    }

    /// Parse one complete log line (no trailing newline) into a record.
    /// Returns `None` for anything that doesn't decode cleanly — the caller
    /// treats that as a torn tail and stops replay.
    pub fn decode(line: &str) -> Option<WalRecord> {
        let (op, tail) = line.split_once('\t')?;
        match op {
            "SET" => {
                let (key, enc) = tail.split_once('\t')?;
                let value = decode_value(enc)?;
                Some(WalRecord::Set { key: key.to_string(), value })
            }
            "DEL" => Some(WalRecord::Delete { key: tail.to_string() }),
            "BULK_SET" => {
                let bytes = STANDARD.decode(tail).ok()?;
                let text = String::from_utf8(bytes).ok()?;
                let array: Vec<(String, Value)> = match serde_json::from_str::<Value>(&text).ok()? {
                    Value::Array(pairs) => pairs
                        .into_iter()
                        .map(|pair| match pair {
                            Value::Array(mut kv) if kv.len() == 2 => {
                                let value = kv.pop().unwrap();
                                let key = kv.pop().unwrap();
                                key.as_str().map(|k| (k.to_string(), value))
                            }
                            _ => None,
                        })
                        .collect::<Option<Vec<_>>>()?,
                    _ => return None,
                };
                Some(WalRecord::BulkSet { items: array })
            }
            _ => None,
        }
    }
}

fn decode_value(encoded: &str) -> Option<Value> {
    let bytes = STANDARD.decode(encoded).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    serde_json::from_str(&text).ok()
}
