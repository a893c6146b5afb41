//! Port interfaces for reachability monitoring
//!
//! These traits define the boundaries between the health monitor and the
//! transports and listeners it talks to.

use async_trait::async_trait;
use edubrain_domain::{ComponentEndpoint, HealthStatus, RequestFailure};
use serde_json::Value;

/// Minimal reachability call against the remote service
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    /// Send one probe and return the decoded payload
    async fn probe(&self) -> Result<Value, RequestFailure>;
}

/// Local view of network connectivity
pub trait NetworkStatus: Send + Sync {
    /// Whether the host believes it has a network connection
    fn is_online(&self) -> bool;
}

/// Listener for health status changes
#[async_trait]
pub trait HealthStatusListener: Send + Sync {
    /// Called when health status changes
    ///
    /// This is only called when `is_healthy` actually flips, not on every
    /// check.
    async fn on_health_changed(&self, status: HealthStatus);
}

/// Check of a single named backend component
#[async_trait]
pub trait ComponentProbe: Send + Sync {
    /// Query `endpoint` and return its payload
    async fn check(&self, endpoint: &ComponentEndpoint) -> Result<Value, RequestFailure>;
}
