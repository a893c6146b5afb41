//! Classification verdicts for failed requests

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Category of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Network,
    Timeout,
    Auth,
    Permission,
    Validation,
    Server,
    Unknown,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Validation => "validation",
            Self::Server => "server",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How loudly a failure should be surfaced.
///
/// Ordered from least to most severe so callers can compare with `>=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// High and critical failures get a persistent notification.
    pub const fn is_escalated(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured verdict produced for every failed request.
///
/// Built fresh per failure and never persisted. Serialized in camelCase so it
/// can be attached to diagnostic log records as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub severity: Severity,
    /// Raw diagnostic text, for logs only.
    pub internal_message: String,
    /// Short message suitable for showing to the user.
    pub user_message: String,
    pub retryable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_delay_ms: Option<u64>,
    #[serde(default)]
    pub requires_reauth: bool,
}

impl ErrorInfo {
    /// Non-retryable verdict without reauthentication.
    pub fn new(
        kind: ErrorKind,
        severity: Severity,
        internal_message: impl Into<String>,
        user_message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            internal_message: internal_message.into(),
            user_message: user_message.into(),
            retryable: false,
            retry_delay_ms: None,
            requires_reauth: false,
        }
    }

    /// Mark the failure as retryable after `delay_ms`.
    #[must_use]
    pub const fn retry_after(mut self, delay_ms: u64) -> Self {
        self.retryable = true;
        self.retry_delay_ms = Some(delay_ms);
        self
    }

    /// Mark the failure as invalidating the current credential.
    #[must_use]
    pub const fn with_reauth(mut self) -> Self {
        self.requires_reauth = true;
        self
    }

    /// Retry delay as a [`Duration`], if one was assigned.
    pub fn retry_delay(&self) -> Option<Duration> {
        self.retry_delay_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering_and_escalation() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::Medium > Severity::Low);
        assert!(Severity::High.is_escalated());
        assert!(Severity::Critical.is_escalated());
        assert!(!Severity::Medium.is_escalated());
    }

    #[test]
    fn builder_sets_retry_policy() {
        let info = ErrorInfo::new(ErrorKind::Server, Severity::High, "boom", "try later")
            .retry_after(3000);

        assert!(info.retryable);
        assert_eq!(info.retry_delay(), Some(Duration::from_millis(3000)));
        assert!(!info.requires_reauth);
    }

    #[test]
    fn serializes_in_camel_case() {
        let info =
            ErrorInfo::new(ErrorKind::Auth, Severity::High, "auth failed", "sign in").with_reauth();
        let json = serde_json::to_value(&info).unwrap();

        assert_eq!(json["kind"], "auth");
        assert_eq!(json["severity"], "high");
        assert_eq!(json["userMessage"], "sign in");
        assert_eq!(json["requiresReauth"], true);
        assert!(json.get("retryDelayMs").is_none());
    }
}
