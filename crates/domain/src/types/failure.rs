//! Transport-level failures handed to the classifier

use serde_json::Value;
use thiserror::Error;

/// What went wrong with an outbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureCause {
    /// The server answered with a non-success status.
    Status { code: u16, body: Option<Value> },
    /// The request did not complete before its deadline.
    DeadlineElapsed,
    /// The request never reached the server.
    NoConnectivity,
    /// Anything else, including rejected response envelopes.
    Other,
}

/// A failed outbound request.
///
/// Carries the raw diagnostic message alongside the cause so the message can
/// be logged verbatim while the cause drives classification.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct RequestFailure {
    cause: FailureCause,
    message: String,
    method: Option<String>,
    endpoint: Option<String>,
}

impl RequestFailure {
    pub fn new(cause: FailureCause, message: impl Into<String>) -> Self {
        Self { cause, message: message.into(), method: None, endpoint: None }
    }

    /// Non-success response with an optional decoded body.
    pub fn status(code: u16, body: Option<Value>) -> Self {
        Self::new(FailureCause::Status { code, body }, format!("HTTP {code}"))
    }

    pub fn deadline_elapsed(message: impl Into<String>) -> Self {
        Self::new(FailureCause::DeadlineElapsed, message)
    }

    pub fn no_connectivity(message: impl Into<String>) -> Self {
        Self::new(FailureCause::NoConnectivity, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(FailureCause::Other, message)
    }

    /// Attach the request line the failure belongs to.
    #[must_use]
    pub fn with_request(mut self, method: impl Into<String>, endpoint: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Attach only the endpoint, when the method is not known.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Replace the diagnostic message, keeping the cause.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub const fn cause(&self) -> &FailureCause {
        &self.cause
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// HTTP status code, when the server answered.
    pub const fn status_code(&self) -> Option<u16> {
        match &self.cause {
            FailureCause::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Decoded response body, when the server answered with one.
    pub const fn body(&self) -> Option<&Value> {
        match &self.cause {
            FailureCause::Status { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// The `message` field of the response body, if it is a string.
    pub fn body_message(&self) -> Option<&str> {
        self.body().and_then(|body| body.get("message")).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn status_failure_exposes_code_and_body_message() {
        let failure = RequestFailure::status(400, Some(json!({ "message": "name is required" })))
            .with_request("POST", "/questions");

        assert_eq!(failure.status_code(), Some(400));
        assert_eq!(failure.body_message(), Some("name is required"));
        assert_eq!(failure.method(), Some("POST"));
        assert_eq!(failure.endpoint(), Some("/questions"));
        assert_eq!(failure.to_string(), "HTTP 400");
    }

    #[test]
    fn non_string_body_message_is_ignored() {
        let failure = RequestFailure::status(500, Some(json!({ "message": 42 })));
        assert_eq!(failure.body_message(), None);
    }

    #[test]
    fn transport_failures_have_no_status() {
        let failure = RequestFailure::deadline_elapsed("operation timed out");
        assert_eq!(failure.status_code(), None);
        assert!(failure.body().is_none());
        assert_eq!(failure.cause(), &FailureCause::DeadlineElapsed);
    }
}
