//! Conversions from external infrastructure errors into domain errors.
//!
//! Setup failures (building clients, reading files) become [`ClientError`]
//! through [`InfraError`]. Failures of individual requests become
//! [`RequestFailure`] through [`IntoRequestFailure`] so the classifier can
//! see what actually went wrong.

use edubrain_domain::{ClientError, RequestFailure};
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ClientError);

impl From<InfraError> for ClientError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ClientError> for InfraError {
    fn from(value: ClientError) -> Self {
        Self(value)
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ClientError */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        if value.is_builder() {
            return Self(ClientError::Config(format!("invalid HTTP client setup: {value}")));
        }
        Self(ClientError::Transport(value.to_string()))
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → ClientError */
/* -------------------------------------------------------------------------- */

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        Self(ClientError::Storage(format!("I/O failure: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → RequestFailure */
/* -------------------------------------------------------------------------- */

/// Conversion of transport errors into classifiable request failures.
pub trait IntoRequestFailure {
    fn into_request_failure(self) -> RequestFailure;
}

impl IntoRequestFailure for HttpError {
    fn into_request_failure(self) -> RequestFailure {
        let message = self.to_string();
        let failure = if self.is_timeout() {
            RequestFailure::deadline_elapsed(message)
        } else if is_connectivity_error(&self) {
            RequestFailure::no_connectivity(message)
        } else if let Some(status) = self.status() {
            RequestFailure::status(status.as_u16(), None).with_message(message)
        } else {
            RequestFailure::other(message)
        };

        match self.url() {
            Some(url) => failure.with_endpoint(url.path()),
            None => failure,
        }
    }
}

fn is_connectivity_error(err: &HttpError) -> bool {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if err.is_connect() {
            return true;
        }
    }
    err.is_request() && !err.is_body() && !err.is_decode()
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
