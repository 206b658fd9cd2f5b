//! Optional full-text and similarity indexes over the value map. Both are
//! volatile: rebuilt entirely from the map on startup, never persisted, never
//! replicated. An index error never affects the underlying mutation's
//! success.

mod fulltext;
mod similarity;

pub use fulltext::FullTextIndex;
pub use similarity::{ScoredKey, SimilarityIndex};

use serde_json::Value;

/// Coerces a value to the text it contributes to an index: a JSON string is
/// indexed verbatim, anything else is indexed via its compact JSON text.
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Lowercase alphanumeric-run tokenizer shared by both indexes.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in text.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            current.push(ch);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_splits_on_non_alphanumeric() {
        assert_eq!(tokenize("Hello, World! 42"), vec!["hello", "world", "42"]);
    }

    #[test]
    fn tokenize_empty_string_yields_no_tokens() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn coerce_text_indexes_string_values_verbatim() {
        assert_eq!(coerce_text(&Value::String("hi there".into())), "hi there");
    }

    #[test]
    fn coerce_text_indexes_non_string_values_as_compact_json() {
        assert_eq!(coerce_text(&serde_json::json!({"a": 1})), "{\"a\":1}");
    }
}
