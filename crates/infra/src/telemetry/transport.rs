//! HTTP delivery of log batches

use std::sync::Arc;

use async_trait::async_trait;
use edubrain_core::LogTransport;
use edubrain_domain::{LogBatch, RequestFailure, RequestOptions};
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::api::ApiClient;

/// Posts `{ "logs": [...] }` to the log endpoint.
///
/// Requests are quiet so that a failing log endpoint never feeds back into
/// the error handler.
pub struct HttpLogTransport {
    api: Arc<ApiClient>,
    endpoint: String,
}

impl HttpLogTransport {
    pub fn new(api: Arc<ApiClient>, endpoint: impl Into<String>) -> Self {
        Self { api, endpoint: endpoint.into() }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LogTransport for HttpLogTransport {
    async fn deliver(&self, batch: &LogBatch) -> Result<(), RequestFailure> {
        self.api.post(&self.endpoint, batch, RequestOptions::quiet()).await.map(|_| ())
    }

    fn beacon(&self, batch: LogBatch) -> bool {
        let Ok(handle) = Handle::try_current() else {
            warn!(count = batch.len(), "no runtime available for beacon delivery");
            return false;
        };

        let api = self.api.clone();
        let endpoint = self.endpoint.clone();
        handle.spawn(async move {
            if let Err(failure) = api.post(&endpoint, &batch, RequestOptions::quiet()).await {
                debug!(error = %failure, "beacon delivery failed");
            }
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;
    use edubrain_common::SystemClock;
    use edubrain_core::CredentialLifecycle;
    use edubrain_domain::{ApiConfig, CredentialConfig, LogContext, LogLevel, LogRecord};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::auth::MemoryStore;

    fn transport(base_url: &str) -> HttpLogTransport {
        let credentials = Arc::new(CredentialLifecycle::new(
            Arc::new(MemoryStore::new()),
            Arc::new(SystemClock),
            CredentialConfig::default(),
        ));
        let config = ApiConfig { base_url: base_url.to_string(), ..ApiConfig::default() };
        let api = Arc::new(ApiClient::new(&config, credentials).unwrap());
        HttpLogTransport::new(api, "/logs/frontend")
    }

    fn batch(message: &str) -> LogBatch {
        LogBatch::new(vec![LogRecord::new(LogLevel::Info, message, LogContext::new(), Utc::now())])
    }

    #[tokio::test]
    async fn deliver_posts_logs_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/logs/frontend"))
            .and(body_partial_json(json!({ "logs": [{ "level": "info", "message": "hello" }] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        transport(&server.uri()).deliver(&batch("hello")).await.unwrap();
    }

    #[tokio::test]
    async fn deliver_surfaces_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(500)).mount(&server).await;

        let failure = transport(&server.uri()).deliver(&batch("hello")).await.unwrap_err();
        assert_eq!(failure.status_code(), Some(500));
    }

    #[tokio::test]
    async fn beacon_posts_without_waiting() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/logs/frontend"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        assert!(transport(&server.uri()).beacon(batch("bye")));

        for _ in 0..50 {
            if !server.received_requests().await.unwrap_or_default().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    #[test]
    fn beacon_outside_runtime_is_refused() {
        let transport = transport("http://127.0.0.1:9");
        assert!(!transport.beacon(batch("bye")));
    }
}
