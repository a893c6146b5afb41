//! Batched shipping of diagnostic records
//!
//! Records are queued with ambient context and shipped as one batch when the
//! queue reaches its threshold, when the flush timer fires, or when the host
//! unloads. A failed batch goes back to the front of the queue; delivery
//! problems are reported through `tracing` only.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use edubrain_common::{BackgroundWorker, SharedClock, SubscriptionSet};
use edubrain_core::{ClientEnvironment, LogFacade, LogQueue, LogTransport, PageEvent, PageEvents};
use edubrain_domain::{
    ClientError, LogBatch, LogContext, LogLevel, LogRecord, LoggingConfig, Result,
};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Queue of diagnostic records with periodic delivery.
pub struct LogBatcher {
    inner: Arc<BatcherInner>,
    flush_interval: Duration,
    worker: BackgroundWorker,
    subscriptions: SubscriptionSet,
}

impl LogBatcher {
    pub fn new(
        transport: Arc<dyn LogTransport>,
        environment: Arc<dyn ClientEnvironment>,
        config: &LoggingConfig,
        clock: SharedClock,
    ) -> Self {
        let inner = BatcherInner {
            queue: Mutex::new(LogQueue::new(config.max_queue)),
            flushing: AtomicBool::new(false),
            transport,
            environment,
            clock,
        };

        Self {
            inner: Arc::new(inner),
            flush_interval: config.flush_interval(),
            worker: BackgroundWorker::new("log-batcher"),
            subscriptions: SubscriptionSet::new(),
        }
    }

    /// Queue a record; reaching the threshold starts a flush right away.
    pub fn log(&self, level: LogLevel, message: &str, context: LogContext) {
        let record = self.inner.record(level, message, context);
        let flush_due = self.inner.queue.lock().push(record);

        if flush_due {
            debug!("log queue reached its threshold, flushing");
            self.inner.spawn_flush();
        }
    }

    /// Deliver everything queued so far.
    ///
    /// No-op while another flush is in flight or when nothing is queued.
    pub async fn flush(&self) {
        if let Some(pending) = self.inner.begin_flush() {
            pending.deliver().await;
        }
    }

    /// Hand the queue to the fire-and-forget transport and clear it.
    ///
    /// Returns whether a batch was handed off. The queue is emptied even when
    /// the hand-off fails.
    pub fn teardown(&self) -> bool {
        self.inner.teardown()
    }

    pub fn len(&self) -> usize {
        self.inner.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.queue.lock().is_empty()
    }

    /// Copy of the queued records, oldest first.
    pub fn pending(&self) -> Vec<LogRecord> {
        self.inner.queue.lock().iter().cloned().collect()
    }

    /// Start the flush timer and flush on teardown when `events` reports an
    /// unload.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Lifecycle`] if the batcher is already running.
    pub fn start(&self, events: &PageEvents) -> Result<()> {
        if self.worker.is_running() {
            return Err(ClientError::lifecycle("log batcher already running"));
        }

        let weak: Weak<BatcherInner> = Arc::downgrade(&self.inner);
        self.subscriptions.push(events.subscribe("log-batcher", move |event| {
            if *event == PageEvent::Unload {
                if let Some(inner) = weak.upgrade() {
                    inner.teardown();
                }
            }
        }));

        let inner = self.inner.clone();
        let period = self.flush_interval;
        self.worker
            .start(move |cancel| async move {
                let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

                loop {
                    tokio::select! {
                        () = cancel.cancelled() => {
                            debug!("log flush worker shutting down");
                            break;
                        }
                        _ = ticker.tick() => {
                            if let Some(pending) = inner.begin_flush() {
                                pending.deliver().await;
                            }
                        }
                    }
                }
            })
            .map_err(|err| {
                self.subscriptions.release_all();
                ClientError::lifecycle(err.to_string())
            })?;

        info!(
            flush_interval_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
            "log batcher started"
        );
        Ok(())
    }

    /// Stop the flush timer and the unload listener. Queued records stay.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Lifecycle`] if the timer task does not finish
    /// within the shutdown grace period.
    pub async fn stop(&self) -> Result<()> {
        self.subscriptions.release_all();
        self.worker
            .stop(SHUTDOWN_GRACE)
            .await
            .map_err(|err| ClientError::lifecycle(err.to_string()))?;
        info!(pending = self.len(), "log batcher stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_running()
    }
}

impl LogFacade for LogBatcher {
    fn log(&self, level: LogLevel, message: &str, context: LogContext) {
        LogBatcher::log(self, level, message, context);
    }
}

impl Drop for LogBatcher {
    fn drop(&mut self) {
        self.subscriptions.release_all();
    }
}

struct BatcherInner {
    queue: Mutex<LogQueue>,
    flushing: AtomicBool,
    transport: Arc<dyn LogTransport>,
    environment: Arc<dyn ClientEnvironment>,
    clock: SharedClock,
}

impl BatcherInner {
    fn record(&self, level: LogLevel, message: &str, mut context: LogContext) -> LogRecord {
        context.insert("url".to_string(), Value::String(self.environment.current_url()));
        context.insert("userAgent".to_string(), Value::String(self.environment.user_agent()));
        LogRecord::new(level, message, context, self.clock.utc_now())
    }

    /// Take the flush flag and the whole queue, or `None` if either is
    /// unavailable.
    fn begin_flush(self: &Arc<Self>) -> Option<PendingFlush> {
        if self.flushing.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err()
        {
            debug!("flush already in progress");
            return None;
        }

        let flag = FlushFlag(self.clone());
        let records = self.queue.lock().drain();
        if records.is_empty() {
            return None;
        }
        Some(PendingFlush { records, flag })
    }

    fn spawn_flush(self: &Arc<Self>) {
        let Some(pending) = self.begin_flush() else {
            return;
        };

        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(pending.deliver());
            }
            Err(_) => {
                warn!("no runtime available for log delivery, keeping records queued");
                pending.requeue();
            }
        }
    }

    fn teardown(self: &Arc<Self>) -> bool {
        let Some(pending) = self.begin_flush() else {
            return false;
        };

        let count = pending.records.len();
        let handed_off = self.transport.beacon(LogBatch::new(pending.take()));
        if handed_off {
            debug!(count, "log batch handed to beacon");
        } else {
            warn!(count, "beacon refused log batch, records dropped");
        }
        handed_off
    }
}

/// Clears the flush flag when the flush completes or is abandoned.
struct FlushFlag(Arc<BatcherInner>);

impl Drop for FlushFlag {
    fn drop(&mut self) {
        self.0.flushing.store(false, Ordering::Release);
    }
}

/// A drained batch that still owns the flush flag.
struct PendingFlush {
    records: Vec<LogRecord>,
    flag: FlushFlag,
}

impl PendingFlush {
    fn inner(&self) -> &Arc<BatcherInner> {
        &self.flag.0
    }

    fn take(mut self) -> Vec<LogRecord> {
        std::mem::take(&mut self.records)
    }

    fn requeue(mut self) {
        let records = std::mem::take(&mut self.records);
        self.inner().queue.lock().restore_front(records);
    }

    #[instrument(skip(self), fields(count = self.records.len()))]
    async fn deliver(mut self) {
        let batch = LogBatch::new(std::mem::take(&mut self.records));
        let transport = self.inner().transport.clone();
        let outcome = transport.deliver(&batch).await;

        match outcome {
            Ok(()) => debug!("log batch delivered"),
            Err(failure) => {
                warn!(error = %failure, "log batch delivery failed, requeueing");
                self.inner().queue.lock().restore_front(batch.into_records());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use edubrain_common::MockClock;
    use edubrain_domain::RequestFailure;

    use super::*;
    use crate::host::StaticEnvironment;

    #[derive(Default)]
    struct RecordingTransport {
        fail: AtomicBool,
        refuse_beacon: AtomicBool,
        delay: Mutex<Duration>,
        attempts: AtomicUsize,
        delivered: Mutex<Vec<LogBatch>>,
        beacons: Mutex<Vec<LogBatch>>,
    }

    impl RecordingTransport {
        fn delivered_messages(&self) -> Vec<Vec<String>> {
            self.delivered
                .lock()
                .iter()
                .map(|b| b.logs.iter().map(|r| r.message.clone()).collect())
                .collect()
        }
    }

    #[async_trait]
    impl LogTransport for RecordingTransport {
        async fn deliver(&self, batch: &LogBatch) -> std::result::Result<(), RequestFailure> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let delay = *self.delay.lock();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(RequestFailure::status(502, None));
            }
            self.delivered.lock().push(batch.clone());
            Ok(())
        }

        fn beacon(&self, batch: LogBatch) -> bool {
            self.beacons.lock().push(batch);
            !self.refuse_beacon.load(Ordering::SeqCst)
        }
    }

    fn batcher(max_queue: usize) -> (LogBatcher, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::default());
        let config = LoggingConfig { max_queue, ..LoggingConfig::default() };
        let batcher = LogBatcher::new(
            transport.clone(),
            Arc::new(StaticEnvironment::new("app://edubrain/quiz/3", "edubrain-test")),
            &config,
            Arc::new(MockClock::new()),
        );
        (batcher, transport)
    }

    fn messages(batcher: &LogBatcher) -> Vec<String> {
        batcher.pending().into_iter().map(|r| r.message).collect()
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test]
    async fn records_carry_ambient_context() {
        let (batcher, _) = batcher(100);
        let mut context = LogContext::new();
        context.insert("questionId".to_string(), Value::from(12));

        batcher.log(LogLevel::Warn, "slow answer", context);

        let record = &batcher.pending()[0];
        assert_eq!(record.level, LogLevel::Warn);
        assert_eq!(record.context["questionId"], 12);
        assert_eq!(record.context["url"], "app://edubrain/quiz/3");
        assert_eq!(record.context["userAgent"], "edubrain-test");
    }

    #[tokio::test(start_paused = true)]
    async fn reaching_threshold_flushes_immediately() {
        let (batcher, transport) = batcher(100);

        for i in 0..99 {
            batcher.info(&format!("record {i}"), LogContext::new());
        }
        settle().await;
        assert!(transport.delivered.lock().is_empty());

        batcher.info("record 99", LogContext::new());
        settle().await;

        let delivered = transport.delivered_messages();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].len(), 100);
        assert_eq!(delivered[0][0], "record 0");
        assert!(batcher.is_empty());
    }

    #[tokio::test]
    async fn failed_batch_returns_to_front_in_order() {
        let (batcher, transport) = batcher(100);
        transport.fail.store(true, Ordering::SeqCst);

        batcher.info("a", LogContext::new());
        batcher.info("b", LogContext::new());
        batcher.flush().await;
        assert_eq!(messages(&batcher), vec!["a", "b"]);

        batcher.info("c", LogContext::new());
        transport.fail.store(false, Ordering::SeqCst);
        batcher.flush().await;

        assert_eq!(transport.delivered_messages(), vec![vec!["a", "b", "c"]]);
        assert!(batcher.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn records_logged_during_failed_flush_stay_behind() {
        let (batcher, transport) = batcher(100);
        transport.fail.store(true, Ordering::SeqCst);
        *transport.delay.lock() = Duration::from_millis(100);

        batcher.info("a", LogContext::new());
        batcher.info("b", LogContext::new());

        tokio::join!(batcher.flush(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            batcher.info("c", LogContext::new());
        });

        assert_eq!(messages(&batcher), vec!["a", "b", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_is_skipped_while_in_flight_or_empty() {
        let (batcher, transport) = batcher(100);
        batcher.flush().await;
        assert_eq!(transport.attempts.load(Ordering::SeqCst), 0);

        *transport.delay.lock() = Duration::from_millis(100);
        batcher.info("a", LogContext::new());
        tokio::join!(batcher.flush(), batcher.flush());

        assert_eq!(transport.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn teardown_clears_queue_even_when_beacon_refuses() {
        let (batcher, transport) = batcher(100);
        transport.refuse_beacon.store(true, Ordering::SeqCst);
        batcher.error("fatal", LogContext::new());

        assert!(!batcher.teardown());
        assert!(batcher.is_empty());
        assert_eq!(transport.beacons.lock().len(), 1);
        assert!(!batcher.teardown());
    }

    #[tokio::test(start_paused = true)]
    async fn timer_flushes_until_stopped() {
        let (batcher, transport) = batcher(100);
        let events = PageEvents::new();
        batcher.start(&events).unwrap();
        assert!(batcher.start(&events).is_err());

        batcher.info("tick", LogContext::new());
        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert!(transport.delivered.lock().is_empty());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(transport.delivered_messages(), vec![vec!["tick"]]);

        batcher.stop().await.unwrap();
        assert_eq!(events.listener_count(), 0);

        batcher.info("late", LogContext::new());
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(transport.delivered.lock().len(), 1);
        assert_eq!(messages(&batcher), vec!["late"]);
    }

    #[tokio::test]
    async fn unload_event_sends_beacon() {
        let (batcher, transport) = batcher(100);
        let events = PageEvents::new();
        batcher.start(&events).unwrap();
        batcher.info("leaving", LogContext::new());

        events.emit(PageEvent::Unload);

        assert_eq!(transport.beacons.lock()[0].logs[0].message, "leaving");
        assert!(batcher.is_empty());
        batcher.stop().await.unwrap();
    }
}
