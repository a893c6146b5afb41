//! HTTP probes used by the health monitor and component checks

use std::sync::Arc;

use async_trait::async_trait;
use edubrain_core::{ComponentProbe, ReachabilityProbe};
use edubrain_domain::{
    ClientError, ComponentEndpoint, HealthConfig, RequestFailure, RequestOptions,
};
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::api::ApiClient;
use crate::http::{status_failure, validate_http_url, HttpClient};

/// Reachability probe against `<origin><probe_path>`.
///
/// Runs on its own HTTP client so probes never carry credentials and never
/// reach the error handler.
pub struct HttpProbe {
    http: HttpClient,
    url: String,
}

impl HttpProbe {
    pub fn new(config: &HealthConfig) -> Result<Self, ClientError> {
        validate_http_url("health.origin", &config.origin)?;

        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let http =
            HttpClient::builder().timeout(config.probe_timeout()).default_headers(headers).build()?;
        let url = format!("{}{}", config.origin.trim_end_matches('/'), config.probe_path);

        Ok(Self { http, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ReachabilityProbe for HttpProbe {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn probe(&self) -> Result<Value, RequestFailure> {
        let response = self.http.send(self.http.request(Method::GET, &self.url), None).await?;
        if !response.status().is_success() {
            return Err(status_failure(response).await);
        }

        // A reachable server with an unreadable body is reported as a
        // malformed payload, not as a transport failure.
        match response.json::<Value>().await {
            Ok(payload) => Ok(payload),
            Err(err) => {
                debug!(error = %err, "health payload is not JSON");
                Ok(Value::Null)
            }
        }
    }
}

/// Component checks routed through the API client.
///
/// Calls are quiet: a failing component is reported in the aggregate, not
/// through the error handler.
pub struct ApiComponentProbe {
    api: Arc<ApiClient>,
    options: RequestOptions,
}

impl ApiComponentProbe {
    pub fn new(api: Arc<ApiClient>, config: &HealthConfig) -> Self {
        Self { api, options: RequestOptions::quiet().with_timeout(config.probe_timeout()) }
    }
}

#[async_trait]
impl ComponentProbe for ApiComponentProbe {
    async fn check(&self, endpoint: &ComponentEndpoint) -> Result<Value, RequestFailure> {
        let response = self.api.get(&endpoint.path, self.options.clone()).await?;
        Ok(response.data.unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use edubrain_domain::FailureCause;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(server: &MockServer) -> HealthConfig {
        HealthConfig { origin: server.uri(), ..HealthConfig::default() }
    }

    #[tokio::test]
    async fn probe_sends_no_cache_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .and(header("Cache-Control", "no-cache"))
            .and(header("Pragma", "no-cache"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "healthy" })))
            .expect(1)
            .mount(&server)
            .await;

        let probe = HttpProbe::new(&config(&server)).unwrap();
        let payload = probe.probe().await.unwrap();

        assert_eq!(payload["status"], "healthy");
    }

    #[tokio::test]
    async fn probe_reports_status_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(ResponseTemplate::new(503)).mount(&server).await;

        let probe = HttpProbe::new(&config(&server)).unwrap();
        let failure = probe.probe().await.unwrap_err();

        assert_eq!(failure.status_code(), Some(503));
    }

    #[tokio::test]
    async fn probe_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let config = HealthConfig { probe_timeout_ms: 50, ..config(&server) };
        let probe = HttpProbe::new(&config).unwrap();

        assert_eq!(probe.probe().await.unwrap_err().cause(), &FailureCause::DeadlineElapsed);
    }

    #[tokio::test]
    async fn non_json_body_is_null_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
            .mount(&server)
            .await;

        let probe = HttpProbe::new(&config(&server)).unwrap();
        assert_eq!(probe.probe().await.unwrap(), Value::Null);
    }
}
