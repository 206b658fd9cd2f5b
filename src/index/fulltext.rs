//! Inverted full-text index with AND-semantics intersection search.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use super::{coerce_text, tokenize};

#[derive(Default)]
pub struct FullTextIndex {
    postings: HashMap<String, HashSet<String>>,
    tokens_by_key: HashMap<String, HashSet<String>>,
}

impl FullTextIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the index entirely from the given key/value pairs, as done
    /// on startup after WAL replay.
    pub fn rebuild<'a>(entries: impl Iterator<Item = (&'a String, &'a Value)>) -> Self {
        let mut index = FullTextIndex::new();
        for (key, value) in entries {
            index.add_key(key, value);
        }
        index
    }

    /// Retracts `key`'s old postings, if any, then indexes it under `value`.
    pub fn add_key(&mut self, key: &str, value: &Value) {
        self.remove_key(key);
        let tokens: HashSet<String> = tokenize(&coerce_text(value)).into_iter().collect();
        for token in &tokens {
            self.postings.entry(token.clone()).or_default().insert(key.to_string());
        }
        self.tokens_by_key.insert(key.to_string(), tokens);
    }

    pub fn remove_key(&mut self, key: &str) {
        if let Some(tokens) = self.tokens_by_key.remove(key) {
            for token in tokens {
                if let Some(keys) = self.postings.get_mut(&token) {
                    keys.remove(key);
                    if keys.is_empty() {
                        self.postings.remove(&token);
                    }
                }
            }
        }
    }

    /// AND-semantics intersection across every token in the query. An empty
    /// query yields an empty result.
    pub fn search(&self, query: &str) -> Vec<String> {
        let query_tokens = tokenize(query);
        if query_tokens.is_empty() {
            return Vec::new();
        }
        let mut result: Option<HashSet<String>> = None;
        for token in query_tokens {
            let keys = self.postings.get(&token).cloned().unwrap_or_default();
            result = Some(match result {
                None => keys,
                Some(acc) => acc.intersection(&keys).cloned().collect(),
            });
            if result.as_ref().map(|s| s.is_empty()).unwrap_or(false) {
                break;
            }
        }
        let mut keys: Vec<String> = result.unwrap_or_default().into_iter().collect();
        keys.sort();
        keys
    }
}
