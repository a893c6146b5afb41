//! Reachability and component health snapshots

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Latest known reachability of the remote service.
///
/// Only the health monitor mutates this; everyone else gets copies.
/// `is_healthy` implies both `server_reachable` and `is_network_online`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub is_healthy: bool,
    pub is_network_online: bool,
    pub server_reachable: bool,
    pub latency_ms: Option<u64>,
    pub consecutive_failures: u32,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    /// Payload returned by the last probe that reached the server.
    pub server_info: Option<Value>,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            is_healthy: false,
            is_network_online: true,
            server_reachable: false,
            latency_ms: None,
            consecutive_failures: 0,
            last_checked_at: None,
            last_error: None,
            server_info: None,
        }
    }
}

/// Outcome of a single named component check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentCheck {
    pub name: String,
    pub healthy: bool,
    pub data: Option<Value>,
    pub error: Option<String>,
}

/// Aggregated result of checking several components at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentReport {
    pub overall: bool,
    pub components: Vec<ComponentCheck>,
    pub healthy_count: usize,
    pub total_count: usize,
    pub checked_at: DateTime<Utc>,
}

impl ComponentReport {
    /// Build a report; overall health requires at least half of the
    /// components (rounded up) to be healthy.
    pub fn from_checks(components: Vec<ComponentCheck>, checked_at: DateTime<Utc>) -> Self {
        let total_count = components.len();
        let healthy_count = components.iter().filter(|c| c.healthy).count();
        let overall = total_count > 0 && healthy_count >= total_count.div_ceil(2);
        Self { overall, components, healthy_count, total_count, checked_at }
    }

    pub fn component(&self, name: &str) -> Option<&ComponentCheck> {
        self.components.iter().find(|c| c.name == name)
    }
}
