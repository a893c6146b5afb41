//! Aggregated health of named backend components

use std::sync::Arc;
use std::time::Duration;

use edubrain_common::SharedClock;
use edubrain_core::ComponentProbe;
use edubrain_domain::{ComponentCheck, ComponentEndpoint, ComponentReport, HealthConfig};
use futures::future::join_all;
use tracing::{debug, instrument};

/// Runs every configured component check concurrently.
pub struct ComponentHealthChecker {
    probe: Arc<dyn ComponentProbe>,
    components: Vec<ComponentEndpoint>,
    timeout: Duration,
    clock: SharedClock,
}

impl ComponentHealthChecker {
    pub fn new(probe: Arc<dyn ComponentProbe>, config: &HealthConfig, clock: SharedClock) -> Self {
        Self {
            probe,
            components: config.components.clone(),
            timeout: config.probe_timeout(),
            clock,
        }
    }

    pub fn components(&self) -> &[ComponentEndpoint] {
        &self.components
    }

    /// Check all components; overall health needs at least half of them.
    #[instrument(skip(self), fields(components = self.components.len()))]
    pub async fn check_all(&self) -> ComponentReport {
        let checks =
            join_all(self.components.iter().map(|endpoint| self.check_one(endpoint))).await;
        let report = ComponentReport::from_checks(checks, self.clock.utc_now());
        debug!(
            healthy = report.healthy_count,
            total = report.total_count,
            overall = report.overall,
            "component health checked"
        );
        report
    }

    async fn check_one(&self, endpoint: &ComponentEndpoint) -> ComponentCheck {
        let outcome = tokio::time::timeout(self.timeout, self.probe.check(endpoint)).await;
        match outcome {
            Ok(Ok(data)) => ComponentCheck {
                name: endpoint.name.clone(),
                healthy: true,
                data: Some(data),
                error: None,
            },
            Ok(Err(failure)) => ComponentCheck {
                name: endpoint.name.clone(),
                healthy: false,
                data: None,
                error: Some(failure.to_string()),
            },
            Err(_) => ComponentCheck {
                name: endpoint.name.clone(),
                healthy: false,
                data: None,
                error: Some(format!("no answer within {}ms", self.timeout.as_millis())),
            },
        }
    }
}
