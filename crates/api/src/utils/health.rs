//! Health snapshot of a running [`ClientContext`](crate::ClientContext)
//!
//! Combines the reachability monitor, the component report and the state of
//! every background task into one serialisable value.

use edubrain_domain::{ComponentReport, HealthStatus};
use serde::Serialize;

use crate::ClientContext;

/// Whether a background task is currently scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskState {
    pub name: &'static str,
    pub running: bool,
}

/// Overall health of the client
///
/// `is_healthy` requires a reachable server and a healthy component report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientHealth {
    pub is_healthy: bool,
    pub reachability: HealthStatus,
    /// Latency bucket of the last probe (`excellent`, `good`, ...).
    pub connection_quality: String,
    pub components: ComponentReport,
    pub tasks: Vec<TaskState>,
    pub pending_logs: usize,
    pub credential_valid: bool,
}

impl ClientHealth {
    pub(crate) fn collect(ctx: &ClientContext, components: ComponentReport) -> Self {
        let reachability = ctx.health.status();
        let tasks = vec![
            TaskState { name: "health-monitor", running: ctx.health.is_running() },
            TaskState { name: "log-batcher", running: ctx.logger.is_running() },
            TaskState { name: "credential-refresh", running: ctx.credential_refresh.is_running() },
        ];

        Self {
            is_healthy: reachability.is_healthy && components.overall,
            connection_quality: ctx.health.connection_quality().to_string(),
            reachability,
            components,
            tasks,
            pending_logs: ctx.logger.len(),
            credential_valid: ctx.credentials.is_valid(),
        }
    }

    /// Names of tasks that are not running.
    pub fn stopped_tasks(&self) -> Vec<&'static str> {
        self.tasks.iter().filter(|task| !task.running).map(|task| task.name).collect()
    }
}
