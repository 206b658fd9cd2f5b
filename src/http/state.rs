//! Shared application state handed to every axum handler.

use std::sync::Mutex;

use serde_json::Value;

use crate::index::{FullTextIndex, SimilarityIndex};
use crate::replication::ReplicatedEngine;

struct IndexState {
    fulltext: FullTextIndex,
    similarity: SimilarityIndex,
}

pub struct AppState {
    pub engine: ReplicatedEngine,
    index: Option<Mutex<IndexState>>,
}

impl AppState {
    pub fn new(engine: ReplicatedEngine, indexing_enabled: bool) -> Self {
        let index = if indexing_enabled {
            let fulltext = FullTextIndex::rebuild(
                engine.engine().snapshot().iter().map(|(k, v)| (k, v)),
            );
            Some(Mutex::new(IndexState { fulltext, similarity: SimilarityIndex::new() }))
        } else {
            None
        };
        AppState { engine, index }
    }

    pub fn indexing_enabled(&self) -> bool {
        self.index.is_some()
    }

    /// Indexes (or re-indexes) `key` under `value` if indexing is on and the
    /// mutation actually applied — a flaky-skipped apply must not touch the
    /// index either, matching the underlying map.
    pub fn note_set(&self, key: &str, value: &Value, applied: bool) {
        if !applied {
            return;
        }
        if let Some(index) = &self.index {
            index.lock().expect("index lock poisoned").fulltext.add_key(key, value);
        }
    }

    pub fn note_delete(&self, key: &str, applied: bool) {
        if !applied {
            return;
        }
        if let Some(index) = &self.index {
            index.lock().expect("index lock poisoned").fulltext.remove_key(key);
        }
    }

    pub fn search(&self, query: &str) -> Option<Vec<String>> {
        self.index.as_ref().map(|index| index.lock().expect("index lock poisoned").fulltext.search(query))
    }

    pub fn search_similar(&self, query: &str, top_k: usize) -> Option<Vec<crate::index::ScoredKey>> {
        self.index
            .as_ref()
            .map(|index| index.lock().expect("index lock poisoned").similarity.search(query, top_k))
    }
}
