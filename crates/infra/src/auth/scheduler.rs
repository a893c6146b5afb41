//! Periodic local extension of the stored credential

use std::sync::Arc;
use std::time::Duration;

use edubrain_common::{BackgroundWorker, SubscriptionSet};
use edubrain_core::{CredentialLifecycle, PageEvent, PageEvents};
use edubrain_domain::{ClientError, Credential, Result};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Runs [`CredentialLifecycle::maybe_auto_refresh`] on a timer and whenever
/// the client becomes visible again, as long as the credential is valid.
pub struct CredentialRefreshScheduler {
    credentials: Arc<CredentialLifecycle>,
    interval: Duration,
    worker: BackgroundWorker,
    subscriptions: SubscriptionSet,
}

impl CredentialRefreshScheduler {
    pub fn new(credentials: Arc<CredentialLifecycle>) -> Self {
        let interval = credentials.config().refresh_interval();
        Self {
            credentials,
            interval,
            worker: BackgroundWorker::new("credential-refresh"),
            subscriptions: SubscriptionSet::new(),
        }
    }

    /// Run one refresh attempt now.
    pub fn tick(&self) -> Option<Credential> {
        refresh_if_due(&self.credentials)
    }

    /// # Errors
    ///
    /// Returns [`ClientError::Lifecycle`] if the scheduler is already running.
    pub fn start(&self, events: &PageEvents) -> Result<()> {
        if self.worker.is_running() {
            return Err(ClientError::lifecycle("credential refresh already running"));
        }

        let credentials = Arc::downgrade(&self.credentials);
        self.subscriptions.push(events.subscribe("credential-refresh", move |event| {
            if let PageEvent::VisibilityChanged { visible: true } = event {
                if let Some(credentials) = credentials.upgrade() {
                    refresh_if_due(&credentials);
                }
            }
        }));

        let credentials = self.credentials.clone();
        let period = self.interval;
        self.worker
            .start(move |cancel| async move {
                let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

                loop {
                    tokio::select! {
                        () = cancel.cancelled() => break,
                        _ = ticker.tick() => {
                            refresh_if_due(&credentials);
                        }
                    }
                }
            })
            .map_err(|err| {
                self.subscriptions.release_all();
                ClientError::lifecycle(err.to_string())
            })?;

        info!(
            interval_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
            "credential refresh scheduled"
        );
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ClientError::Lifecycle`] if the timer task does not finish
    /// within the shutdown grace period.
    pub async fn stop(&self) -> Result<()> {
        self.subscriptions.release_all();
        self.worker
            .stop(SHUTDOWN_GRACE)
            .await
            .map_err(|err| ClientError::lifecycle(err.to_string()))
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_running()
    }
}

impl Drop for CredentialRefreshScheduler {
    fn drop(&mut self) {
        self.subscriptions.release_all();
    }
}

fn refresh_if_due(credentials: &CredentialLifecycle) -> Option<Credential> {
    if !credentials.is_valid() {
        debug!("no valid credential to refresh");
        return None;
    }

    match credentials.maybe_auto_refresh() {
        Ok(refreshed) => refreshed,
        Err(err) => {
            warn!(error = %err, "credential refresh failed");
            None
        }
    }
}
