//! Configuration loader
//!
//! Builds a [`ClientConfig`] from defaults, an optional file and environment
//! overrides.
//!
//! ## Loading Strategy
//! 1. Start from a config file if one is found, otherwise from defaults
//! 2. Apply environment variable overrides on top
//! 3. Validate the result
//!
//! ## Environment Variables
//! - `EDUBRAIN_API_BASE_URL`: API base URL
//! - `EDUBRAIN_API_TIMEOUT_MS`: default request timeout in milliseconds
//! - `EDUBRAIN_HEALTH_ORIGIN`: origin the reachability probe targets
//! - `EDUBRAIN_HEALTH_INTERVAL_MS`: probe interval in milliseconds
//! - `EDUBRAIN_LOG_MAX_QUEUE`: queue length that triggers a log flush
//! - `EDUBRAIN_LOG_FLUSH_INTERVAL_MS`: log flush interval in milliseconds
//! - `EDUBRAIN_SHOW_NOTIFICATIONS`: whether failures notify the user
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./edubrain.json` or `./edubrain.toml` (current working directory)
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use edubrain_domain::{ClientConfig, ClientError, Result};

/// Load configuration with the file, defaults and environment layered.
///
/// # Errors
/// Returns `ClientError::Config` if a discovered file cannot be parsed, an
/// environment variable has an invalid value, or validation fails.
pub fn load() -> Result<ClientConfig> {
    let config = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("No config file found, using defaults");
            ClientConfig::default()
        }
    };

    let config = apply_env_overrides(config)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Format is detected by
/// file extension; missing fields take their defaults.
///
/// # Errors
/// Returns `ClientError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ClientError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ClientError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ClientError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Overlay environment variables onto `config`.
///
/// # Errors
/// Returns `ClientError::Config` if a numeric variable cannot be parsed.
pub fn apply_env_overrides(mut config: ClientConfig) -> Result<ClientConfig> {
    if let Some(base_url) = env_string("EDUBRAIN_API_BASE_URL") {
        config.api.base_url = base_url;
    }
    if let Some(timeout_ms) = env_parse("EDUBRAIN_API_TIMEOUT_MS")? {
        config.api.timeout_ms = timeout_ms;
    }
    if let Some(origin) = env_string("EDUBRAIN_HEALTH_ORIGIN") {
        config.health.origin = origin;
    }
    if let Some(interval_ms) = env_parse("EDUBRAIN_HEALTH_INTERVAL_MS")? {
        config.health.interval_ms = interval_ms;
    }
    if let Some(max_queue) = env_parse("EDUBRAIN_LOG_MAX_QUEUE")? {
        config.logging.max_queue = max_queue;
    }
    if let Some(flush_ms) = env_parse("EDUBRAIN_LOG_FLUSH_INTERVAL_MS")? {
        config.logging.flush_interval_ms = flush_ms;
    }
    config.errors.show_notifications =
        env_bool("EDUBRAIN_SHOW_NOTIFICATIONS", config.errors.show_notifications);

    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `ClientError::Config` if format is invalid or parsing fails.
pub fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ClientError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ClientError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(ClientError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| {
            ["config.json", "config.toml", "edubrain.json", "edubrain.toml"]
                .into_iter()
                .map(move |name| dir.join(name))
        })
        .find(|path| path.exists())
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_string(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ClientError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
