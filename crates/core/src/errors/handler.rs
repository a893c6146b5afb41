//! Central handling of failed requests
//!
//! Every failure goes through the same pipeline: classify, log, notify, run
//! the optional callback, then invalidate the credential when the verdict
//! demands reauthentication. The caller always gets the verdict back; the
//! handler never raises.

use std::future::Future;
use std::sync::Arc;

use edubrain_domain::constants::ERROR_NOTIFICATION_TITLE;
use edubrain_domain::{
    ErrorHandlerConfig, ErrorInfo, ErrorKind, LogContext, Notification, NotificationTone,
    RequestFailure,
};
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use super::classifier::ErrorClassifier;
use super::ports::{ErrorCallback, Navigator, Notifier};
use crate::auth::CredentialLifecycle;
use crate::telemetry::LogFacade;

/// Classifies, reports and reacts to failed requests.
pub struct ErrorHandler {
    config: ErrorHandlerConfig,
    logger: Option<Arc<dyn LogFacade>>,
    notifier: Option<Arc<dyn Notifier>>,
    navigator: Option<Arc<dyn Navigator>>,
    credentials: Option<Arc<CredentialLifecycle>>,
    on_error: Option<ErrorCallback>,
}

impl ErrorHandler {
    /// Create a handler with no collaborators attached.
    pub fn new(config: ErrorHandlerConfig) -> Self {
        Self {
            config,
            logger: None,
            notifier: None,
            navigator: None,
            credentials: None,
            on_error: None,
        }
    }

    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn LogFacade>) -> Self {
        self.logger = Some(logger);
        self
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    #[must_use]
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Arc<CredentialLifecycle>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Register a hook that sees every handled failure.
    #[must_use]
    pub fn with_callback(mut self, callback: ErrorCallback) -> Self {
        self.on_error = Some(callback);
        self
    }

    pub const fn config(&self) -> &ErrorHandlerConfig {
        &self.config
    }

    /// Classify `failure` and run every configured reaction.
    pub fn handle(&self, failure: &RequestFailure, context: &LogContext) -> ErrorInfo {
        let info = ErrorClassifier::classify(failure);
        debug!(
            kind = %info.kind,
            severity = %info.severity,
            status = ?failure.status_code(),
            endpoint = ?failure.endpoint(),
            "handling request failure"
        );

        if self.config.log_errors {
            self.log_failure(failure, &info, context);
        }

        if self.config.show_notifications {
            self.notify(&info);
        }

        if let Some(callback) = &self.on_error {
            callback(failure, &info, context);
        }

        if info.requires_reauth {
            self.reauthenticate();
        }

        info
    }

    /// Run `retry_fn` once after the verdict's delay.
    ///
    /// Returns `None` for non-retryable verdicts and when the retry itself
    /// fails; a failed retry is logged, never propagated.
    pub async fn retry<T, F, Fut>(&self, info: &ErrorInfo, retry_fn: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, RequestFailure>>,
    {
        if !info.retryable {
            return None;
        }

        if let Some(delay) = info.retry_delay() {
            tokio::time::sleep(delay).await;
        }

        match retry_fn().await {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(error = %err, kind = %info.kind, "retry failed");
                None
            }
        }
    }

    /// Await `call`, handling a failure before returning it unchanged.
    ///
    /// `operation` is added to the context under `function`.
    #[instrument(skip(self, context, call))]
    pub async fn with_error_handling<T, Fut>(
        &self,
        operation: &str,
        context: LogContext,
        call: Fut,
    ) -> Result<T, RequestFailure>
    where
        Fut: Future<Output = Result<T, RequestFailure>>,
    {
        match call.await {
            Ok(value) => Ok(value),
            Err(failure) => {
                let mut context = context;
                context.insert("function".to_string(), Value::String(operation.to_string()));
                self.handle(&failure, &context);
                Err(failure)
            }
        }
    }

    fn log_failure(&self, failure: &RequestFailure, info: &ErrorInfo, context: &LogContext) {
        let Some(logger) = &self.logger else {
            return;
        };

        let mut record = LogContext::new();
        record.insert(
            "error".to_string(),
            json!({
                "message": failure.message(),
                "status": failure.status_code(),
                "method": failure.method(),
                "endpoint": failure.endpoint(),
                "response": failure.body(),
            }),
        );
        record.insert(
            "errorInfo".to_string(),
            serde_json::to_value(info).unwrap_or(Value::Null),
        );
        record.insert("context".to_string(), Value::Object(context.clone()));

        logger.error("Error handled", record);
    }

    fn notify(&self, info: &ErrorInfo) {
        let Some(notifier) = &self.notifier else {
            return;
        };

        let notification = if info.severity.is_escalated() {
            Notification::persistent(
                ERROR_NOTIFICATION_TITLE,
                info.user_message.clone(),
                NotificationTone::Error,
                self.config.persistent_duration(),
            )
        } else {
            let tone = if info.kind == ErrorKind::Validation {
                NotificationTone::Warning
            } else {
                NotificationTone::Error
            };
            Notification::toast(info.user_message.clone(), tone, self.config.toast_duration())
        };

        notifier.notify(notification);
    }

    fn reauthenticate(&self) {
        if let Some(credentials) = &self.credentials {
            credentials.clear();
        }

        let Some(navigator) = &self.navigator else {
            return;
        };

        let entry = self.config.auth_entry_path.as_str();
        if navigator.current_path() == entry {
            debug!(path = entry, "already at authentication entry point");
            return;
        }

        info!(path = entry, "redirecting to authentication entry point");
        navigator.redirect(entry);
    }
}
