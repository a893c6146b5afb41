//! Configuration structures
//!
//! Every field has a default so a partial TOML or JSON document (or none at
//! all) yields a usable configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    AUTH_ENTRY_PATH, DEFAULT_API_BASE_URL, DEFAULT_API_TIMEOUT_MS, DEFAULT_HEALTH_INTERVAL_MS,
    DEFAULT_HEALTH_ORIGIN, DEFAULT_LOG_ENDPOINT, DEFAULT_LOG_FLUSH_INTERVAL_MS,
    DEFAULT_LOG_MAX_QUEUE, DEFAULT_PROBE_PATH, DEFAULT_PROBE_TIMEOUT_MS, DEFAULT_TOKEN_TTL_SECS,
    HEALTHY_SENTINEL, PERSISTENT_NOTIFICATION_MS, SECONDARY_STORE_TTL_SECS, TOAST_NOTIFICATION_MS,
    TOKEN_EXPIRY_KEY, TOKEN_KEY, TOKEN_REFRESH_INTERVAL_MS, TOKEN_REFRESH_THRESHOLD_SECS,
};
use crate::errors::{ClientError, Result};

/// Top-level client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub health: HealthConfig,
    pub logging: LoggingConfig,
    pub credentials: CredentialConfig,
    pub errors: ErrorHandlerConfig,
}

impl ClientConfig {
    /// Reject values that would make timers spin or requests never finish.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(ClientError::Config("api.base_url must not be empty".into()));
        }
        if self.api.timeout_ms == 0 {
            return Err(ClientError::Config("api.timeout_ms must be positive".into()));
        }
        if self.health.interval_ms == 0 {
            return Err(ClientError::Config("health.interval_ms must be positive".into()));
        }
        if self.logging.max_queue == 0 {
            return Err(ClientError::Config("logging.max_queue must be positive".into()));
        }
        if self.logging.flush_interval_ms == 0 {
            return Err(ClientError::Config("logging.flush_interval_ms must be positive".into()));
        }
        if self.credentials.refresh_interval_ms == 0 {
            return Err(ClientError::Config(
                "credentials.refresh_interval_ms must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_API_BASE_URL.to_string(), timeout_ms: DEFAULT_API_TIMEOUT_MS }
    }
}

impl ApiConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// A named endpoint checked by the component health aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentEndpoint {
    pub name: String,
    pub path: String,
}

impl ComponentEndpoint {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self { name: name.into(), path: path.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Origin the reachability probe is sent to, without the API prefix.
    pub origin: String,
    pub probe_path: String,
    pub interval_ms: u64,
    pub probe_timeout_ms: u64,
    pub healthy_sentinel: String,
    /// Component endpoints, relative to the API base URL.
    pub components: Vec<ComponentEndpoint>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_HEALTH_ORIGIN.to_string(),
            probe_path: DEFAULT_PROBE_PATH.to_string(),
            interval_ms: DEFAULT_HEALTH_INTERVAL_MS,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            healthy_sentinel: HEALTHY_SENTINEL.to_string(),
            components: vec![
                ComponentEndpoint::new("system", "/system-monitor/health"),
                ComponentEndpoint::new("database", "/db-monitor/health"),
                ComponentEndpoint::new("api_proxy", "/api-proxy-management/status"),
            ],
        }
    }
}

impl HealthConfig {
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Queue length that triggers an immediate flush.
    pub max_queue: usize,
    pub flush_interval_ms: u64,
    /// Log endpoint, relative to the API base URL.
    pub endpoint: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            max_queue: DEFAULT_LOG_MAX_QUEUE,
            flush_interval_ms: DEFAULT_LOG_FLUSH_INTERVAL_MS,
            endpoint: DEFAULT_LOG_ENDPOINT.to_string(),
        }
    }
}

impl LoggingConfig {
    pub const fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialConfig {
    pub token_key: String,
    pub expiry_key: String,
    pub default_ttl_secs: u64,
    /// Lifetime of entries written to the secondary store.
    pub secondary_ttl_secs: u64,
    /// Tokens with less than this many seconds left are extended.
    pub refresh_threshold_secs: u64,
    pub refresh_interval_ms: u64,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            token_key: TOKEN_KEY.to_string(),
            expiry_key: TOKEN_EXPIRY_KEY.to_string(),
            default_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            secondary_ttl_secs: SECONDARY_STORE_TTL_SECS,
            refresh_threshold_secs: TOKEN_REFRESH_THRESHOLD_SECS,
            refresh_interval_ms: TOKEN_REFRESH_INTERVAL_MS,
        }
    }
}

impl CredentialConfig {
    pub const fn secondary_ttl(&self) -> Duration {
        Duration::from_secs(self.secondary_ttl_secs)
    }

    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

/// Behaviour switches for the error handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorHandlerConfig {
    pub show_notifications: bool,
    pub log_errors: bool,
    /// Path of the authentication entry point reauth redirects to.
    pub auth_entry_path: String,
    pub persistent_duration_ms: u64,
    pub toast_duration_ms: u64,
}

impl Default for ErrorHandlerConfig {
    fn default() -> Self {
        Self {
            show_notifications: true,
            log_errors: true,
            auth_entry_path: AUTH_ENTRY_PATH.to_string(),
            persistent_duration_ms: PERSISTENT_NOTIFICATION_MS,
            toast_duration_ms: TOAST_NOTIFICATION_MS,
        }
    }
}

impl ErrorHandlerConfig {
    pub const fn persistent_duration(&self) -> Duration {
        Duration::from_millis(self.persistent_duration_ms)
    }

    pub const fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ClientConfig::default();

        assert_eq!(config.api.base_url, "http://localhost:5000/api");
        assert_eq!(config.api.timeout(), Duration::from_secs(60));
        assert_eq!(config.health.interval(), Duration::from_secs(30));
        assert_eq!(config.health.probe_timeout(), Duration::from_secs(5));
        assert_eq!(config.health.components.len(), 3);
        assert_eq!(config.logging.max_queue, 100);
        assert_eq!(config.logging.flush_interval(), Duration::from_secs(5));
        assert_eq!(config.credentials.token_key, "edubrain-token");
        assert_eq!(config.credentials.default_ttl_secs, 604_800);
        assert_eq!(config.errors.auth_entry_path, "/login");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{ "logging": { "max_queue": 10 } }"#).unwrap();

        assert_eq!(config.logging.max_queue, 10);
        assert_eq!(config.logging.endpoint, "/logs/frontend");
        assert_eq!(config.api, ApiConfig::default());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut config = ClientConfig::default();
        config.health.interval_ms = 0;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
