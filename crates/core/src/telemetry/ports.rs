//! Port interfaces for diagnostic logging

use async_trait::async_trait;
use edubrain_domain::{LogBatch, LogContext, LogLevel, RequestFailure};

/// Sink for diagnostic records destined for the server
///
/// Components log through this trait explicitly; nothing intercepts
/// `tracing` output.
pub trait LogFacade: Send + Sync {
    /// Record a message with structured context
    fn log(&self, level: LogLevel, message: &str, context: LogContext);

    fn debug(&self, message: &str, context: LogContext) {
        self.log(LogLevel::Debug, message, context);
    }

    fn info(&self, message: &str, context: LogContext) {
        self.log(LogLevel::Info, message, context);
    }

    fn warn(&self, message: &str, context: LogContext) {
        self.log(LogLevel::Warn, message, context);
    }

    fn error(&self, message: &str, context: LogContext) {
        self.log(LogLevel::Error, message, context);
    }
}

/// Delivery of log batches to the server
#[async_trait]
pub trait LogTransport: Send + Sync {
    /// Deliver a batch and wait for the server to accept it
    async fn deliver(&self, batch: &LogBatch) -> Result<(), RequestFailure>;

    /// Dispatch a batch without waiting for the outcome
    ///
    /// Used during teardown. Returns `false` when the batch could not even be
    /// handed off.
    fn beacon(&self, batch: LogBatch) -> bool;
}

/// Ambient details merged into every record
pub trait ClientEnvironment: Send + Sync {
    /// Location the client is currently showing
    fn current_url(&self) -> String;

    /// Agent string identifying the client
    fn user_agent(&self) -> String;
}
