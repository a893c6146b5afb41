use std::time::Duration;

use edubrain_domain::{ClientError, RequestFailure};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::errors::{InfraError, IntoRequestFailure};

/// Thin wrapper over reqwest with per-call timeout and failure mapping.
///
/// Each call is sent exactly once; retry decisions are left to callers.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    timeout: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, ClientError> {
        Self::builder().build()
    }

    /// Client-wide timeout applied when a call does not override it.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute `builder`, overriding the timeout when `timeout` is set.
    ///
    /// Any response, including non-success statuses, is returned as `Ok`;
    /// only transport failures become `Err`.
    pub async fn send(
        &self,
        builder: RequestBuilder,
        timeout: Option<Duration>,
    ) -> Result<Response, RequestFailure> {
        let builder = match timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        };

        let request = builder.build().map_err(IntoRequestFailure::into_request_failure)?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                debug!(%method, %url, status = %response.status(), "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, %url, error = %err, "HTTP request failed");
                Err(err.into_request_failure().with_request(method.as_str(), url.path()))
            }
        }
    }
}

/// Turn a non-success response into a status failure, keeping a JSON body.
pub async fn status_failure(response: Response) -> RequestFailure {
    let code = response.status().as_u16();
    let reason = response.status().canonical_reason().unwrap_or("unknown status");
    let message = format!("HTTP {code} {reason}");
    let body = response.json::<Value>().await.ok();
    RequestFailure::status(code, body).with_message(message)
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(60), default_headers: None }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient, ClientError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            ClientError::from(infra)
        })?;

        Ok(HttpClient { client, timeout: self.timeout })
    }
}

/// Check that `raw` is an absolute `http`/`https` URL.
///
/// # Errors
///
/// Returns [`ClientError::Config`] naming `field` otherwise.
pub fn validate_http_url(field: &str, raw: &str) -> Result<Url, ClientError> {
    let url = Url::parse(raw)
        .map_err(|err| ClientError::Config(format!("{field} is not a valid URL ({raw}): {err}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ClientError::Config(format!("{field} must use http or https, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use edubrain_domain::FailureCause;
    use reqwest::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn returns_response_of_any_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().expect("http client");
        let response =
            client.send(client.request(Method::GET, server.uri()), None).await.expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn per_call_timeout_overrides_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
            .mount(&server)
            .await;

        let client = HttpClient::new().expect("http client");
        let result = client
            .send(client.request(Method::GET, server.uri()), Some(Duration::from_millis(20)))
            .await;

        let failure = result.expect_err("should time out");
        assert_eq!(failure.cause(), &FailureCause::DeadlineElapsed);
        assert_eq!(failure.method(), Some("GET"));
    }

    #[tokio::test]
    async fn refused_connection_is_connectivity_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED

        let client = HttpClient::new().expect("http client");
        let result = client.send(client.request(Method::GET, format!("http://{addr}")), None).await;

        assert_eq!(result.unwrap_err().cause(), &FailureCause::NoConnectivity);
    }

    #[tokio::test]
    async fn status_failure_keeps_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/questions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "message": "empty" })))
            .mount(&server)
            .await;

        let client = HttpClient::new().expect("http client");
        let response = client
            .send(client.request(Method::POST, format!("{}/questions", server.uri())), None)
            .await
            .expect("response");

        let failure = status_failure(response).await;
        assert_eq!(failure.status_code(), Some(400));
        assert_eq!(failure.body_message(), Some("empty"));
        assert_eq!(failure.message(), "HTTP 400 Bad Request");
    }

    #[test]
    fn url_validation_requires_http_scheme() {
        assert!(validate_http_url("api.base_url", "https://edubrain.example/api").is_ok());

        let err = validate_http_url("api.base_url", "ftp://edubrain.example").unwrap_err();
        assert!(matches!(err, ClientError::Config(ref m) if m.contains("http or https")));

        let err = validate_http_url("health.origin", "localhost").unwrap_err();
        assert!(err.to_string().contains("health.origin"));
    }
}
