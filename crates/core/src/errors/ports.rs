//! Port interfaces used by the error handler

use std::sync::Arc;

use edubrain_domain::{ErrorInfo, LogContext, Notification, RequestFailure};

/// Presents notifications to the user
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Client-side navigation
pub trait Navigator: Send + Sync {
    /// Path of the view currently shown
    fn current_path(&self) -> String;

    /// Navigate to `path`
    fn redirect(&self, path: &str);
}

/// Hook invoked for every handled failure.
pub type ErrorCallback = Arc<dyn Fn(&RequestFailure, &ErrorInfo, &LogContext) + Send + Sync>;
