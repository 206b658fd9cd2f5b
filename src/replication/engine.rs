//! Wraps a `KvEngine` with role state and peer fanout. Composition, not
//! inheritance: a `ReplicatedEngine` owns a `KvEngine` and delegates to it,
//! it does not subclass it.

use std::sync::RwLock;
use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};

use crate::engine::KvEngine;
use crate::error::{StoreError, StoreResult};
use crate::replication::errors::ReplicationError;
use crate::replication::role::Role;

const PEER_TIMEOUT: Duration = Duration::from_secs(5);

struct RoleState {
    role: Role,
    peers: Vec<String>,
}

pub struct ReplicatedEngine {
    engine: KvEngine,
    // Role is protected by a lock independent of the engine's own mutation
    // lock; a role read must happen-before the operation's WAL append so
    // dispatch gates correctly against a concurrent demotion.
    role_state: RwLock<RoleState>,
    client: Client,
}

impl ReplicatedEngine {
    pub fn new(engine: KvEngine, role: Role, peers: Vec<String>) -> Self {
        ReplicatedEngine {
            engine,
            role_state: RwLock::new(RoleState { role, peers }),
            client: Client::builder().timeout(PEER_TIMEOUT).build().expect("client"),
        }
    }

    pub fn engine(&self) -> &KvEngine {
        &self.engine
    }

    pub fn role(&self) -> Role {
        self.role_state.read().expect("role lock poisoned").role
    }

    pub fn is_primary(&self) -> bool {
        self.role().is_primary()
    }

    pub fn peers(&self) -> Vec<String> {
        self.role_state.read().expect("role lock poisoned").peers.clone()
    }

    /// Idempotent: promoting an already-primary node is a no-op.
    pub fn promote_to_primary(&self) {
        self.role_state.write().expect("role lock poisoned").role = Role::Primary;
    }

    pub fn demote_to_secondary(&self, peers: Vec<String>) {
        let mut state = self.role_state.write().expect("role lock poisoned");
        state.role = Role::Secondary;
        state.peers = peers;
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.engine.get(key)
    }

    /// Returns whether the local in-memory apply actually happened (see
    /// `KvEngine::set`); fanout to peers happens regardless, since the WAL
    /// record is durable either way.
    pub async fn set(&self, key: String, value: Value, debug_flaky: Option<f64>) -> StoreResult<bool> {
        self.require_primary()?;
        let applied = self.engine.set(key.clone(), value.clone(), debug_flaky)?;
        self.fan_out("/replicate/set", json!({"key": key, "value": value})).await;
        Ok(applied)
    }

    pub async fn delete(&self, key: String, debug_flaky: Option<f64>) -> StoreResult<bool> {
        self.require_primary()?;
        let applied = self.engine.delete(key.clone(), debug_flaky)?;
        self.fan_out("/replicate/delete", json!({"key": key})).await;
        Ok(applied)
    }

    pub async fn bulk_set(&self, items: Vec<(String, Value)>, debug_flaky: Option<f64>) -> StoreResult<bool> {
        self.require_primary()?;
        let applied = self.engine.bulk_set(items.clone(), debug_flaky)?;
        let wire_items: Vec<Value> = items
            .into_iter()
            .map(|(k, v)| json!([k, v]))
            .collect();
        self.fan_out("/replicate/bulk_set", json!({"items": wire_items})).await;
        Ok(applied)
    }

    /// Applies a replicated write without re-fanning out and regardless of
    /// role, so a secondary (or a node not yet promoted) stays consistent.
    pub fn apply_replicate_set(&self, key: String, value: Value) -> StoreResult<()> {
        self.engine.set(key, value, None)?;
        Ok(())
    }

    pub fn apply_replicate_delete(&self, key: String) -> StoreResult<()> {
        self.engine.delete(key, None)?;
        Ok(())
    }

    pub fn apply_replicate_bulk_set(&self, items: Vec<(String, Value)>) -> StoreResult<()> {
        self.engine.bulk_set(items, None)?;
        Ok(())
    }

    fn require_primary(&self) -> StoreResult<()> {
        if self.is_primary() {
            Ok(())
        } else {
            Err(StoreError::NotPrimary)
        }
    }

    async fn fan_out(&self, path: &str, body: Value) {
        let peers = self.peers();
        for peer in peers {
            let url = format!("{peer}{path}");
            match self.client.post(&url).json(&body).send().await {
                Ok(resp) if resp.status().is_success() => {}
                Ok(resp) => {
                    let err = ReplicationError::rejected(&peer, resp.status().as_u16());
                    eprintln!("replication fanout failed: {err}");
                }
                Err(e) if e.is_timeout() => {
                    eprintln!("replication fanout failed: {}", ReplicationError::timed_out(&peer));
                }
                Err(_) => {
                    eprintln!("replication fanout failed: {}", ReplicationError::unreachable(&peer));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn engine(dir: &std::path::Path) -> KvEngine {
        KvEngine::open(dir).unwrap()
    }

    #[tokio::test]
    async fn secondary_rejects_client_mutations() {
        let dir = tempdir().unwrap();
        let replicated = ReplicatedEngine::new(engine(dir.path()), Role::Secondary, vec![]);
        let err = replicated.set("k".into(), json!("v"), None).await.unwrap_err();
        assert!(matches!(err, StoreError::NotPrimary));
        assert_eq!(replicated.get("k"), None);
    }

    #[tokio::test]
    async fn primary_accepts_mutations() {
        let dir = tempdir().unwrap();
        let replicated = ReplicatedEngine::new(engine(dir.path()), Role::Primary, vec![]);
        replicated.set("k".into(), json!("v"), None).await.unwrap();
        assert_eq!(replicated.get("k"), Some(json!("v")));
    }

    #[tokio::test]
    async fn promote_is_idempotent_on_an_existing_primary() {
        let dir = tempdir().unwrap();
        let replicated = ReplicatedEngine::new(engine(dir.path()), Role::Primary, vec![]);
        replicated.promote_to_primary();
        assert!(replicated.is_primary());
    }

    #[tokio::test]
    async fn apply_replicate_set_bypasses_role_check() {
        let dir = tempdir().unwrap();
        let replicated = ReplicatedEngine::new(engine(dir.path()), Role::Secondary, vec![]);
        replicated.apply_replicate_set("k".into(), json!("v")).unwrap();
        assert_eq!(replicated.get("k"), Some(json!("v")));
    }

    #[tokio::test]
    async fn demote_replaces_peer_list() {
        let dir = tempdir().unwrap();
        let replicated = ReplicatedEngine::new(engine(dir.path()), Role::Primary, vec!["http://a".into()]);
        replicated.demote_to_secondary(vec!["http://b".into()]);
        assert_eq!(replicated.role(), Role::Secondary);
        assert_eq!(replicated.peers(), vec!["http://b".to_string()]);
    }
}
