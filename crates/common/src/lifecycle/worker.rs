//! Single background task with explicit start/stop.
//!
//! A worker slot owns at most one spawned task together with the
//! [`CancellationToken`] that ends it. `stop` cancels the token and waits for
//! the task to return, bounded by a grace period.

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors raised while starting or stopping a background worker.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkerError {
    #[error("{0} is already running")]
    AlreadyRunning(&'static str),

    #[error("{0} did not stop within {1:?}")]
    ShutdownTimeout(&'static str, Duration),

    #[error("{name} task failed: {message}")]
    Join { name: &'static str, message: String },
}

struct Running {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

/// Slot holding one background task.
pub struct BackgroundWorker {
    name: &'static str,
    running: Mutex<Option<Running>>,
}

impl BackgroundWorker {
    pub const fn new(name: &'static str) -> Self {
        Self { name, running: Mutex::new(None) }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Spawn `task` with a fresh cancellation token.
    ///
    /// Must be called from within a tokio runtime. Fails if a previous task
    /// is still alive.
    pub fn start<F, Fut>(&self, task: F) -> Result<(), WorkerError>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut running = self.running.lock();
        if running.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            return Err(WorkerError::AlreadyRunning(self.name));
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(task(cancel.clone()));
        *running = Some(Running { handle, cancel });

        debug!(worker = self.name, "background worker started");
        Ok(())
    }

    /// Whether a task is alive and has not been asked to stop.
    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .as_ref()
            .is_some_and(|r| !r.cancel.is_cancelled() && !r.handle.is_finished())
    }

    /// Cancel the task and wait up to `grace` for it to finish.
    ///
    /// Stopping an idle slot is a no-op.
    pub async fn stop(&self, grace: Duration) -> Result<(), WorkerError> {
        let Some(Running { handle, cancel }) = self.running.lock().take() else {
            return Ok(());
        };

        cancel.cancel();
        match tokio::time::timeout(grace, handle).await {
            Ok(Ok(())) => {
                info!(worker = self.name, "background worker stopped");
                Ok(())
            }
            Ok(Err(err)) => {
                warn!(worker = self.name, error = %err, "background worker ended abnormally");
                Err(WorkerError::Join { name: self.name, message: err.to_string() })
            }
            Err(_) => {
                warn!(worker = self.name, ?grace, "background worker shutdown timed out");
                Err(WorkerError::ShutdownTimeout(self.name, grace))
            }
        }
    }
}

impl Drop for BackgroundWorker {
    fn drop(&mut self) {
        if let Some(running) = self.running.get_mut().take() {
            running.cancel.cancel();
        }
    }
}
