//! Client constants
//!
//! Centralized location for defaults and wire-level names shared by every
//! layer.

// API client
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_API_TIMEOUT_MS: u64 = 60_000;
pub const ACCESS_TOKEN_HEADER: &str = "X-Access-Token";
pub const CACHE_BUST_PARAM: &str = "_t";

// Reachability probe
pub const DEFAULT_HEALTH_ORIGIN: &str = "http://localhost:5000";
pub const DEFAULT_PROBE_PATH: &str = "/health";
pub const DEFAULT_HEALTH_INTERVAL_MS: u64 = 30_000;
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;
pub const HEALTHY_SENTINEL: &str = "healthy";
pub const NETWORK_LOST_MESSAGE: &str = "Network connection lost";
pub const ABNORMAL_STATUS_MESSAGE: &str = "Server reported an abnormal status";

// Log shipping
pub const DEFAULT_LOG_MAX_QUEUE: usize = 100;
pub const DEFAULT_LOG_FLUSH_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_LOG_ENDPOINT: &str = "/logs/frontend";

// Credentials
pub const TOKEN_KEY: &str = "edubrain-token";
pub const TOKEN_EXPIRY_KEY: &str = "edubrain-token-expire";
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;
pub const SECONDARY_STORE_TTL_SECS: u64 = 7 * 24 * 60 * 60;
pub const TOKEN_REFRESH_THRESHOLD_SECS: u64 = 60 * 60;
pub const TOKEN_REFRESH_INTERVAL_MS: u64 = 5 * 60 * 1000;

// Error handling
pub const AUTH_ENTRY_PATH: &str = "/login";
pub const ERROR_NOTIFICATION_TITLE: &str = "Error";
pub const PERSISTENT_NOTIFICATION_MS: u64 = 5_000;
pub const TOAST_NOTIFICATION_MS: u64 = 3_000;

// Retry delays assigned by the classifier
pub const RATE_LIMIT_RETRY_MS: u64 = 5_000;
pub const SERVER_ERROR_RETRY_MS: u64 = 3_000;
pub const TIMEOUT_RETRY_MS: u64 = 2_000;
pub const CONNECTIVITY_RETRY_MS: u64 = 3_000;
