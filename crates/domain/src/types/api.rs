//! Response envelopes and per-call request options

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalised API response.
///
/// The server speaks two envelope dialects, `{code, msg, data}` and
/// `{success, data, message}`; both are folded into this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T = Value> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
}

impl ApiResponse<Value> {
    /// Normalise a decoded response body.
    ///
    /// Returns `Err` with the server-provided message when the envelope
    /// reports failure. Bodies that use neither dialect are treated as bare
    /// data.
    pub fn from_envelope(body: Value) -> Result<Self, String> {
        if let Some(code) = body.get("code") {
            let message = body.get("msg").and_then(Value::as_str).filter(|m| !m.is_empty());
            if code.as_i64() == Some(1) {
                let message = message.unwrap_or("success").to_string();
                let data = match body.get("data") {
                    Some(data) if !is_falsy(data) => data.clone(),
                    _ => body.clone(),
                };
                return Ok(Self { success: true, data: Some(data), message });
            }
            return Err(message.unwrap_or("request failed").to_string());
        }

        if let Some(success) = body.get("success") {
            let message = body.get("message").and_then(Value::as_str).filter(|m| !m.is_empty());
            if success.as_bool() == Some(true) {
                return Ok(Self {
                    success: true,
                    data: body.get("data").cloned(),
                    message: message.unwrap_or("success").to_string(),
                });
            }
            return Err(message.unwrap_or("request failed").to_string());
        }

        Ok(Self { success: true, data: Some(body), message: "success".to_string() })
    }

    /// Decode `data` into a typed payload.
    pub fn decode<T: serde::de::DeserializeOwned>(self) -> serde_json::Result<ApiResponse<T>> {
        let data = self.data.map(serde_json::from_value).transpose()?;
        Ok(ApiResponse { success: self.success, data, message: self.message })
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Per-call overrides for outbound requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    /// Overrides the client-wide timeout.
    pub timeout: Option<Duration>,
    /// Whether failures are routed through the error handler.
    pub report_errors: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self { timeout: None, report_errors: true }
    }
}

impl RequestOptions {
    /// Options for calls whose failures must stay silent.
    pub fn quiet() -> Self {
        Self { report_errors: false, ..Self::default() }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
