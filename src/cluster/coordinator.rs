//! Discover the current primary, or promote one, across a fixed list of
//! node endpoints.
//!
//! Election is deterministic by endpoint order, not by WAL length or
//! liveness duration — this is a documented simplification that can promote
//! a node that missed recent writes.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

const PROBE_TIMEOUT: Duration = Duration::from_secs(1);
const PROMOTE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    primary: bool,
}

pub struct ClusterCoordinator {
    endpoints: Vec<String>,
    probe_client: Client,
    promote_client: Client,
}

impl ClusterCoordinator {
    pub fn new(endpoints: Vec<String>) -> Self {
        ClusterCoordinator {
            endpoints,
            probe_client: Client::builder().timeout(PROBE_TIMEOUT).build().expect("client"),
            promote_client: Client::builder().timeout(PROMOTE_TIMEOUT).build().expect("client"),
        }
    }

    /// Probes each node's `/status` in configured order; returns the first
    /// one reporting `primary: true`. Unreachable or non-decoding nodes are
    /// skipped, not fatal.
    pub async fn find_primary(&self) -> Option<String> {
        for endpoint in &self.endpoints {
            if self.probe_is_primary(endpoint).await {
                return Some(endpoint.clone());
            }
        }
        None
    }

    /// Returns the existing primary if one is found; otherwise probes nodes
    /// in order and promotes the first reachable one, skipping any that
    /// don't respond or fail.
    pub async fn elect_primary(&self) -> Option<String> {
        if let Some(existing) = self.find_primary().await {
            return Some(existing);
        }
        for endpoint in &self.endpoints {
            let url = format!("{endpoint}/promote_to_primary");
            match self.promote_client.post(&url).json(&serde_json::json!({})).send().await {
                Ok(resp) if resp.status().is_success() => return Some(endpoint.clone()),
                _ => continue,
            }
        }
        None
    }

    async fn probe_is_primary(&self, endpoint: &str) -> bool {
        let url = format!("{endpoint}/status");
        match self.probe_client.get(&url).send().await {
            Ok(resp) => resp.json::<StatusResponse>().await.map(|s| s.primary).unwrap_or(false),
            Err(_) => false,
        }
    }
}
