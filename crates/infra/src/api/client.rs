//! API client with credential headers and centralised failure handling
//!
//! Every call is sent once. Failures are classified by the attached
//! [`ErrorHandler`] unless the caller asked for a quiet request, and are then
//! returned to the caller unchanged.

use std::sync::{Arc, Weak};

use chrono::Utc;
use edubrain_core::{CredentialLifecycle, ErrorHandler};
use edubrain_domain::constants::{ACCESS_TOKEN_HEADER, CACHE_BUST_PARAM};
use edubrain_domain::{
    ApiConfig, ApiResponse, ClientError, LogContext, RequestFailure, RequestOptions,
};
use parking_lot::RwLock;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::http::{status_failure, validate_http_url, HttpClient};

/// Client for the EduBrain REST API.
pub struct ApiClient {
    http: HttpClient,
    base_url: String,
    credentials: Arc<CredentialLifecycle>,
    error_handler: RwLock<Option<Weak<ErrorHandler>>>,
}

impl ApiClient {
    /// Create a client for `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the base URL is not an absolute
    /// `http`/`https` URL or the underlying HTTP client cannot be built.
    pub fn new(
        config: &ApiConfig,
        credentials: Arc<CredentialLifecycle>,
    ) -> Result<Self, ClientError> {
        validate_http_url("api.base_url", &config.base_url)?;
        let http = HttpClient::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
            error_handler: RwLock::new(None),
        })
    }

    /// Route reported failures through `handler`.
    ///
    /// Only a weak reference is kept; the owner of the handler controls its
    /// lifetime.
    pub fn attach_error_handler(&self, handler: &Arc<ErrorHandler>) {
        *self.error_handler.write() = Some(Arc::downgrade(handler));
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[instrument(skip(self, options), fields(path = %path))]
    pub async fn get(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, RequestFailure> {
        self.execute(Method::GET, path, None, options).await
    }

    #[instrument(skip(self, body, options), fields(path = %path))]
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<ApiResponse, RequestFailure> {
        match Self::encode(body, "POST", path) {
            Ok(body) => self.execute(Method::POST, path, Some(body), options).await,
            Err(failure) => Err(self.fail(failure, &Method::POST, path, &options)),
        }
    }

    #[instrument(skip(self, body, options), fields(path = %path))]
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<ApiResponse, RequestFailure> {
        match Self::encode(body, "PUT", path) {
            Ok(body) => self.execute(Method::PUT, path, Some(body), options).await,
            Err(failure) => Err(self.fail(failure, &Method::PUT, path, &options)),
        }
    }

    #[instrument(skip(self, options), fields(path = %path))]
    pub async fn delete(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, RequestFailure> {
        self.execute(Method::DELETE, path, None, options).await
    }

    fn encode<B: Serialize + ?Sized>(
        body: &B,
        method: &str,
        path: &str,
    ) -> Result<Value, RequestFailure> {
        serde_json::to_value(body).map_err(|err| {
            RequestFailure::other(format!("failed to serialize request body: {err}"))
                .with_request(method, path)
        })
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<ApiResponse, RequestFailure> {
        let url = self.url(path);
        self.send(method.clone(), &url, path, body, options.timeout)
            .await
            .map_err(|failure| self.fail(failure, &method, path, &options))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Tag `failure` with the request and hand it to the error handler
    /// unless the request is quiet.
    fn fail(
        &self,
        failure: RequestFailure,
        method: &Method,
        path: &str,
        options: &RequestOptions,
    ) -> RequestFailure {
        let failure = failure.with_request(method.as_str(), path);
        if options.report_errors {
            self.report(&failure, method.as_str(), &self.url(path));
        } else {
            debug!(%method, path, error = %failure, "quiet request failed");
        }
        failure
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        path: &str,
        body: Option<Value>,
        timeout: Option<std::time::Duration>,
    ) -> Result<ApiResponse, RequestFailure> {
        let mut request =
            self.http.request(method.clone(), url).header(CONTENT_TYPE, "application/json");

        if let Some(token) = self.credentials.get_token() {
            request = request
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .header(ACCESS_TOKEN_HEADER, token);
        }

        if method == Method::GET {
            request = request.query(&[(CACHE_BUST_PARAM, Utc::now().timestamp_millis())]);
        }

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = self.http.send(request, timeout).await?;
        if !response.status().is_success() {
            return Err(status_failure(response).await);
        }

        let bytes = response.bytes().await.map_err(|err| {
            RequestFailure::other(format!("failed to read response body: {err}"))
        })?;
        let payload = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|err| {
                RequestFailure::other(format!("invalid response body: {err}"))
            })?
        };

        debug!(%method, path, "request succeeded");
        ApiResponse::from_envelope(payload).map_err(RequestFailure::other)
    }

    fn report(&self, failure: &RequestFailure, method: &str, url: &str) {
        let handler = self.error_handler.read().as_ref().and_then(Weak::upgrade);
        let Some(handler) = handler else {
            warn!(method, url, error = %failure, "request failed with no error handler attached");
            return;
        };

        let mut context = LogContext::new();
        context.insert("method".to_string(), Value::String(method.to_string()));
        context.insert("url".to_string(), Value::String(url.to_string()));
        handler.handle(failure, &context);
    }
}
