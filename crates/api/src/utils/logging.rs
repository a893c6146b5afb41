//! Tracing subscriber initialisation
//!
//! ## Environment Variables
//! - `EDUBRAIN_LOG`: `EnvFilter` directives (default `info`)
//! - `EDUBRAIN_LOG_FORMAT`: `json` for one JSON object per line, anything
//!   else for human-readable output

use anyhow::{anyhow, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

pub const LOG_FILTER_ENV: &str = "EDUBRAIN_LOG";
pub const LOG_FORMAT_ENV: &str = "EDUBRAIN_LOG_FORMAT";
const DEFAULT_FILTER: &str = "info";

/// Output format of the global subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// Read the format from `EDUBRAIN_LOG_FORMAT`.
    pub fn from_env() -> Self {
        match std::env::var(LOG_FORMAT_ENV) {
            Ok(value) if value.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Build the filter from `EDUBRAIN_LOG`, falling back to `info` when the
/// variable is missing or invalid.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(format: LogFormat) -> Result<()> {
    let fmt_layer = match format {
        LogFormat::Json => fmt::layer().json().with_current_span(true).boxed(),
        LogFormat::Pretty => fmt::layer().with_target(true).with_line_number(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}
