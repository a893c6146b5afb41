//! Diagnostic log records shipped to the server

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form structured context attached to a record.
pub type LogContext = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single diagnostic record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    #[serde(default)]
    pub context: LogContext,
    pub timestamp: DateTime<Utc>,
}

impl LogRecord {
    pub fn new(
        level: LogLevel,
        message: impl Into<String>,
        context: LogContext,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self { level, message: message.into(), context, timestamp }
    }
}

/// Wire body for the log endpoint: `{ "logs": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogBatch {
    pub logs: Vec<LogRecord>,
}

impl LogBatch {
    pub const fn new(logs: Vec<LogRecord>) -> Self {
        Self { logs }
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    pub fn into_records(self) -> Vec<LogRecord> {
        self.logs
    }
}
