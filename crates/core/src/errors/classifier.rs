//! Classification of failed requests
//!
//! Maps a [`RequestFailure`] to an [`ErrorInfo`] verdict. The mapping is
//! total: anything unrecognised becomes `unknown` with medium severity.

use edubrain_domain::constants::{
    CONNECTIVITY_RETRY_MS, RATE_LIMIT_RETRY_MS, SERVER_ERROR_RETRY_MS, TIMEOUT_RETRY_MS,
};
use edubrain_domain::{ErrorInfo, ErrorKind, FailureCause, RequestFailure, Severity};

/// Stateless failure classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify a failed request. Never fails.
    pub fn classify(failure: &RequestFailure) -> ErrorInfo {
        match failure.cause() {
            FailureCause::Status { code, .. } => Self::classify_status(*code, failure),
            FailureCause::DeadlineElapsed => ErrorInfo::new(
                ErrorKind::Timeout,
                Severity::Medium,
                with_detail("request timed out", failure.message()),
                "The request timed out, please check your network connection",
            )
            .retry_after(TIMEOUT_RETRY_MS),
            FailureCause::NoConnectivity => ErrorInfo::new(
                ErrorKind::Network,
                Severity::High,
                with_detail("network connection failed", failure.message()),
                "Network connection failed, please check your network",
            )
            .retry_after(CONNECTIVITY_RETRY_MS),
            FailureCause::Other => {
                let internal = if failure.message().is_empty() {
                    "unknown error".to_string()
                } else {
                    failure.message().to_string()
                };
                ErrorInfo::new(
                    ErrorKind::Unknown,
                    Severity::Medium,
                    internal,
                    "Operation failed, please try again later",
                )
            }
        }
    }

    fn classify_status(code: u16, failure: &RequestFailure) -> ErrorInfo {
        match code {
            400 => ErrorInfo::new(
                ErrorKind::Validation,
                Severity::Medium,
                failure.body_message().unwrap_or("invalid request parameters"),
                "Please check that your input is correct",
            ),
            401 => ErrorInfo::new(
                ErrorKind::Auth,
                Severity::High,
                "authentication failed",
                "Your session has expired, please sign in again",
            )
            .with_reauth(),
            403 => ErrorInfo::new(
                ErrorKind::Permission,
                Severity::High,
                "permission denied",
                "You do not have permission to perform this action",
            ),
            404 => ErrorInfo::new(
                ErrorKind::Validation,
                Severity::Medium,
                "resource not found",
                "The requested resource does not exist",
            ),
            429 => ErrorInfo::new(
                ErrorKind::Network,
                Severity::Medium,
                "too many requests",
                "Too many requests, please try again later",
            )
            .retry_after(RATE_LIMIT_RETRY_MS),
            500 | 502 | 503 | 504 => ErrorInfo::new(
                ErrorKind::Server,
                Severity::High,
                format!("server error ({code})"),
                "The server is temporarily unavailable, please try again later",
            )
            .retry_after(SERVER_ERROR_RETRY_MS),
            _ => ErrorInfo::new(
                ErrorKind::Unknown,
                Severity::Medium,
                failure
                    .body_message()
                    .map_or_else(|| format!("request failed ({code})"), ToString::to_string),
                "Request failed, please try again later",
            ),
        }
    }
}

fn with_detail(summary: &str, detail: &str) -> String {
    if detail.is_empty() {
        summary.to_string()
    } else {
        format!("{summary}: {detail}")
    }
}
