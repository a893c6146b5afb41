//! Periodic reachability monitoring with explicit lifecycle
//!
//! The monitor follows the worker pattern:
//! - `HealthMonitor`: lifecycle coordinator (owns the worker and the page
//!   event subscriptions)
//! - `MonitorState`: shared state and the probe logic, reachable from the
//!   worker loop and from page event listeners
//! - `HealthStatusListener`: downstream consumer, called only on transitions
//!
//! Probe failures never escape; they are folded into [`HealthStatus`].

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use edubrain_common::{BackgroundWorker, SharedClock, SubscriptionSet};
use edubrain_core::{
    ConnectionQuality, ErrorClassifier, HealthStatusListener, NetworkStatus, PageEvent,
    PageEvents, ReachabilityProbe,
};
use edubrain_domain::constants::{ABNORMAL_STATUS_MESSAGE, NETWORK_LOST_MESSAGE};
use edubrain_domain::{ClientError, HealthConfig, HealthStatus, Result};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Background reachability monitor.
pub struct HealthMonitor {
    state: Arc<MonitorState>,
    events: PageEvents,
    interval: Duration,
    worker: BackgroundWorker,
    subscriptions: SubscriptionSet,
}

impl HealthMonitor {
    /// Create a stopped monitor.
    ///
    /// Connectivity is read from `events`, which also delivers the
    /// online/offline notifications once started.
    pub fn new(
        probe: Arc<dyn ReachabilityProbe>,
        events: PageEvents,
        config: &HealthConfig,
        clock: SharedClock,
    ) -> Self {
        let state = MonitorState {
            probe,
            network: Arc::new(events.clone()),
            listener: RwLock::new(None),
            clock,
            sentinel: config.healthy_sentinel.clone(),
            status: RwLock::new(HealthStatus::default()),
            in_flight: AtomicBool::new(false),
            offline_generation: AtomicU64::new(0),
            last_reported: Mutex::new(None),
        };

        Self {
            state: Arc::new(state),
            events,
            interval: config.interval(),
            worker: BackgroundWorker::new("health-monitor"),
            subscriptions: SubscriptionSet::new(),
        }
    }

    /// Attach the status change listener.
    #[must_use]
    pub fn with_listener(self, listener: Arc<dyn HealthStatusListener>) -> Self {
        *self.state.listener.write() = Some(listener);
        self
    }

    /// Subscribe to page events, probe immediately and then every interval.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Lifecycle`] if the monitor is already running.
    pub fn start(&self) -> Result<()> {
        if self.worker.is_running() {
            return Err(ClientError::lifecycle("health monitor already running"));
        }

        *self.state.last_reported.lock() = None;
        self.subscribe_page_events();

        let state = self.state.clone();
        let interval = self.interval;
        self.worker
            .start(move |cancel| async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

                loop {
                    tokio::select! {
                        () = cancel.cancelled() => {
                            debug!("health monitor worker shutting down");
                            break;
                        }
                        _ = ticker.tick() => {
                            state.check().await;
                        }
                    }
                }
            })
            .map_err(|err| {
                self.subscriptions.release_all();
                ClientError::lifecycle(err.to_string())
            })?;

        info!(
            interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            "health monitor started"
        );
        Ok(())
    }

    /// Stop the timer and release every page event listener.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Lifecycle`] if the worker does not finish
    /// within the shutdown grace period.
    pub async fn stop(&self) -> Result<()> {
        let released = self.subscriptions.release_all();
        self.worker
            .stop(SHUTDOWN_GRACE)
            .await
            .map_err(|err| ClientError::lifecycle(err.to_string()))?;
        info!(released, "health monitor stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_running()
    }

    /// Probe now, unless a probe is already in flight, and return the status.
    pub async fn refresh(&self) -> HealthStatus {
        self.state.check().await;
        self.status()
    }

    /// Snapshot of the latest status.
    pub fn status(&self) -> HealthStatus {
        self.state.status.read().clone()
    }

    pub fn connection_quality(&self) -> ConnectionQuality {
        ConnectionQuality::from_latency(self.state.status.read().latency_ms)
    }

    fn subscribe_page_events(&self) {
        let weak: Weak<MonitorState> = Arc::downgrade(&self.state);
        let subscription = self.events.subscribe("health-monitor", move |event| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            match event {
                PageEvent::Online => {
                    debug!("network back online, probing");
                    spawn_detached(async move {
                        state.check().await;
                    });
                }
                PageEvent::Offline => {
                    let status = state.mark_offline();
                    spawn_detached(async move {
                        state.publish(status).await;
                    });
                }
                PageEvent::VisibilityChanged { .. } | PageEvent::Unload => {}
            }
        });
        self.subscriptions.push(subscription);
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.subscriptions.release_all();
    }
}

fn spawn_detached(task: impl std::future::Future<Output = ()> + Send + 'static) {
    match Handle::try_current() {
        Ok(handle) => {
            handle.spawn(task);
        }
        Err(_) => warn!("page event received outside a runtime; skipping health update"),
    }
}

/// Clears the in-flight flag when the probe finishes or is cancelled.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then_some(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct MonitorState {
    probe: Arc<dyn ReachabilityProbe>,
    network: Arc<dyn NetworkStatus>,
    listener: RwLock<Option<Arc<dyn HealthStatusListener>>>,
    clock: SharedClock,
    sentinel: String,
    status: RwLock<HealthStatus>,
    in_flight: AtomicBool,
    /// Bumped under the status lock every time connectivity is lost.
    offline_generation: AtomicU64,
    last_reported: Mutex<Option<bool>>,
}

impl MonitorState {
    #[instrument(skip(self))]
    async fn check(&self) {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            debug!("probe already in flight, skipping");
            return;
        };

        if !self.network.is_online() {
            let status = self.mark_offline();
            self.publish(status).await;
            return;
        }

        let generation = self.offline_generation.load(Ordering::Acquire);
        let started = self.clock.now();
        let result = self.probe.probe().await;
        let latency_ms =
            u64::try_from(self.clock.now().saturating_duration_since(started).as_millis())
                .unwrap_or(u64::MAX);

        let status = {
            let mut status = self.status.write();
            // A probe that straddled an offline event must not overwrite it
            if self.offline_generation.load(Ordering::Acquire) != generation
                || !self.network.is_online()
            {
                debug!("connectivity lost during probe, discarding result");
                return;
            }
            status.is_network_online = true;
            status.last_checked_at = Some(self.clock.utc_now());

            match result {
                Ok(payload) if self.is_healthy_payload(&payload) => {
                    status.is_healthy = true;
                    status.server_reachable = true;
                    status.latency_ms = Some(latency_ms);
                    status.consecutive_failures = 0;
                    status.last_error = None;
                    status.server_info = Some(payload);
                }
                Ok(payload) => {
                    status.is_healthy = false;
                    status.server_reachable = true;
                    status.latency_ms = Some(latency_ms);
                    status.consecutive_failures = status.consecutive_failures.saturating_add(1);
                    status.last_error = Some(ABNORMAL_STATUS_MESSAGE.to_string());
                    status.server_info = Some(payload);
                }
                Err(failure) => {
                    let info = ErrorClassifier::classify(&failure);
                    debug!(kind = %info.kind, error = %failure, "health probe failed");
                    status.is_healthy = false;
                    status.server_reachable = false;
                    status.latency_ms = None;
                    status.consecutive_failures = status.consecutive_failures.saturating_add(1);
                    status.last_error = Some(info.user_message);
                }
            }
            status.clone()
        };

        self.publish(status).await;
    }

    fn is_healthy_payload(&self, payload: &Value) -> bool {
        payload.get("status").and_then(Value::as_str) == Some(self.sentinel.as_str())
    }

    fn mark_offline(&self) -> HealthStatus {
        let mut status = self.status.write();
        self.offline_generation.fetch_add(1, Ordering::AcqRel);
        status.is_healthy = false;
        status.is_network_online = false;
        status.server_reachable = false;
        status.latency_ms = None;
        status.last_error = Some(NETWORK_LOST_MESSAGE.to_string());
        status.last_checked_at = Some(self.clock.utc_now());
        status.clone()
    }

    async fn publish(&self, status: HealthStatus) {
        {
            let mut last = self.last_reported.lock();
            if *last == Some(status.is_healthy) {
                return;
            }
            *last = Some(status.is_healthy);
        }

        if status.is_healthy {
            info!(latency_ms = ?status.latency_ms, "server is healthy");
        } else {
            warn!(
                failures = status.consecutive_failures,
                error = status.last_error.as_deref().unwrap_or_default(),
                "server is unhealthy"
            );
        }

        let listener = self.listener.read().clone();
        if let Some(listener) = listener {
            listener.on_health_changed(status).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use edubrain_common::MockClock;
    use edubrain_domain::RequestFailure;
    use serde_json::json;

    use super::*;

    struct ScriptedProbe {
        calls: AtomicUsize,
        script: Mutex<VecDeque<std::result::Result<Value, RequestFailure>>>,
        delay: Duration,
    }

    impl ScriptedProbe {
        fn new(script: Vec<std::result::Result<Value, RequestFailure>>) -> Arc<Self> {
            Self::slow(script, Duration::ZERO)
        }

        fn slow(
            script: Vec<std::result::Result<Value, RequestFailure>>,
            delay: Duration,
        ) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                script: Mutex::new(script.into()),
                delay,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReachabilityProbe for ScriptedProbe {
        async fn probe(&self) -> std::result::Result<Value, RequestFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.script.lock().pop_front().unwrap_or_else(|| Ok(json!({ "status": "healthy" })))
        }
    }

    #[derive(Default)]
    struct RecordingListener {
        seen: Mutex<Vec<HealthStatus>>,
    }

    impl RecordingListener {
        fn seen(&self) -> Vec<bool> {
            self.seen.lock().iter().map(|s| s.is_healthy).collect()
        }
    }

    #[async_trait]
    impl HealthStatusListener for RecordingListener {
        async fn on_health_changed(&self, status: HealthStatus) {
            self.seen.lock().push(status);
        }
    }

    fn monitor(
        probe: Arc<ScriptedProbe>,
        events: &PageEvents,
    ) -> (HealthMonitor, Arc<RecordingListener>) {
        let listener = Arc::new(RecordingListener::default());
        let monitor = HealthMonitor::new(
            probe,
            events.clone(),
            &HealthConfig::default(),
            Arc::new(MockClock::new()),
        )
        .with_listener(listener.clone());
        (monitor, listener)
    }

    fn refused() -> std::result::Result<Value, RequestFailure> {
        Err(RequestFailure::no_connectivity("connection refused"))
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test]
    async fn repeated_failures_report_once() {
        let probe = ScriptedProbe::new(vec![refused(), refused(), refused()]);
        let (monitor, listener) = monitor(probe.clone(), &PageEvents::new());

        monitor.refresh().await;
        monitor.refresh().await;
        let status = monitor.refresh().await;

        assert!(!status.is_healthy);
        assert!(!status.server_reachable);
        assert_eq!(status.consecutive_failures, 3);
        assert_eq!(
            status.last_error.as_deref(),
            Some("Network connection failed, please check your network")
        );
        assert_eq!(listener.seen(), vec![false]);
        assert_eq!(probe.calls(), 3);
    }

    #[tokio::test]
    async fn healthy_probe_resets_failures() {
        let probe = ScriptedProbe::new(vec![refused(), Ok(json!({ "status": "healthy" }))]);
        let (monitor, listener) = monitor(probe, &PageEvents::new());

        monitor.refresh().await;
        let status = monitor.refresh().await;

        assert!(status.is_healthy);
        assert_eq!(status.consecutive_failures, 0);
        assert_eq!(status.latency_ms, Some(0));
        assert_eq!(status.server_info, Some(json!({ "status": "healthy" })));
        assert!(status.last_checked_at.is_some());
        assert_eq!(listener.seen(), vec![false, true]);
        assert_eq!(monitor.connection_quality(), ConnectionQuality::Excellent);
    }

    #[tokio::test]
    async fn abnormal_payload_is_reachable_but_unhealthy() {
        let probe = ScriptedProbe::new(vec![Ok(json!({ "status": "degraded" }))]);
        let (monitor, _) = monitor(probe, &PageEvents::new());

        let status = monitor.refresh().await;

        assert!(!status.is_healthy);
        assert!(status.server_reachable);
        assert_eq!(status.consecutive_failures, 1);
        assert_eq!(status.last_error.as_deref(), Some(ABNORMAL_STATUS_MESSAGE));
    }

    #[tokio::test]
    async fn offline_network_skips_probe() {
        let probe = ScriptedProbe::new(vec![]);
        let (monitor, listener) = monitor(probe.clone(), &PageEvents::with_online(false));

        let status = monitor.refresh().await;

        assert_eq!(probe.calls(), 0);
        assert!(!status.is_healthy);
        assert!(!status.is_network_online);
        assert_eq!(status.last_error.as_deref(), Some(NETWORK_LOST_MESSAGE));
        assert_eq!(listener.seen(), vec![false]);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_refreshes_send_one_probe() {
        let probe = ScriptedProbe::slow(vec![], Duration::from_millis(100));
        let (monitor, _) = monitor(probe.clone(), &PageEvents::new());

        tokio::join!(monitor.refresh(), monitor.refresh());

        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn start_probes_immediately_and_on_interval() {
        let probe = ScriptedProbe::new(vec![]);
        let events = PageEvents::new();
        let (monitor, listener) = monitor(probe.clone(), &events);

        monitor.start().unwrap();
        settle().await;
        assert_eq!(probe.calls(), 1);
        assert!(monitor.status().is_healthy);

        tokio::time::sleep(Duration::from_millis(30_000)).await;
        assert_eq!(probe.calls(), 2);
        assert_eq!(listener.seen(), vec![true]);

        monitor.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn offline_event_forces_unhealthy_without_probe() {
        let probe = ScriptedProbe::new(vec![]);
        let events = PageEvents::new();
        let (monitor, listener) = monitor(probe.clone(), &events);

        monitor.start().unwrap();
        settle().await;
        events.emit(PageEvent::Offline);
        settle().await;

        let status = monitor.status();
        assert!(!status.is_healthy);
        assert!(!status.is_network_online);
        assert!(!status.server_reachable);
        assert_eq!(probe.calls(), 1);
        assert_eq!(listener.seen(), vec![true, false]);

        events.emit(PageEvent::Online);
        settle().await;
        assert_eq!(probe.calls(), 2);
        assert!(monitor.status().is_healthy);

        monitor.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn offline_during_probe_discards_late_result() {
        let probe = ScriptedProbe::slow(vec![], Duration::from_millis(100));
        let events = PageEvents::new();
        let (monitor, listener) = monitor(probe.clone(), &events);

        monitor.start().unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        events.emit(PageEvent::Offline);
        settle().await;
        assert!(!monitor.status().is_healthy);

        tokio::time::sleep(Duration::from_millis(200)).await;

        let status = monitor.status();
        assert_eq!(probe.calls(), 1);
        assert!(!status.is_healthy);
        assert!(!status.is_network_online);
        assert_eq!(status.last_error.as_deref(), Some(NETWORK_LOST_MESSAGE));
        assert_eq!(listener.seen(), vec![false]);

        monitor.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_leaves_no_timer_or_listener() {
        let probe = ScriptedProbe::new(vec![]);
        let events = PageEvents::new();
        let (monitor, _) = monitor(probe.clone(), &events);

        monitor.start().unwrap();
        assert_eq!(events.listener_count(), 1);
        assert!(monitor.start().is_err());

        monitor.stop().await.unwrap();
        assert!(!monitor.is_running());
        assert_eq!(events.listener_count(), 0);

        let calls = probe.calls();
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(probe.calls(), calls);
    }
}
