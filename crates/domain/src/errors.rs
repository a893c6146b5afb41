//! Error types used throughout the client

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the EduBrain client
///
/// Covers infrastructure setup and lifecycle failures. Failures of individual
/// outbound requests are described by [`crate::RequestFailure`] instead and
/// flow through the error handler rather than through `?`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Lifecycle error: {0}")]
    Lifecycle(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClientError {
    /// Convenience constructor for lifecycle misuse such as double starts.
    pub fn lifecycle(message: impl Into<String>) -> Self {
        Self::Lifecycle(message.into())
    }

    /// Convenience constructor for storage failures.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Result type alias for EduBrain client operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_category_prefix() {
        let err = ClientError::lifecycle("monitor already running");
        assert_eq!(err.to_string(), "Lifecycle error: monitor already running");
    }

    #[test]
    fn serializes_with_type_tag() {
        let err = ClientError::storage("disk full");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "Storage");
        assert_eq!(json["message"], "disk full");
    }
}
