//! Integration tests for the request failure pipeline
//!
//! Wires the API client, error handler, log batcher and credential lifecycle
//! together against a mock server.

use std::sync::Arc;

use edubrain_common::SystemClock;
use edubrain_core::{CredentialLifecycle, ErrorHandler, Navigator, PageEvents};
use edubrain_domain::{
    ApiConfig, CredentialConfig, ErrorHandlerConfig, ErrorKind, HealthConfig, LogLevel,
    LoggingConfig, RequestOptions,
};
use edubrain_infra::{
    ApiClient, HeadlessNavigator, HealthMonitor, HttpLogTransport, HttpProbe, LogBatcher,
    MemoryStore, StaticEnvironment,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Stack {
    api: Arc<ApiClient>,
    credentials: Arc<CredentialLifecycle>,
    navigator: Arc<HeadlessNavigator>,
    batcher: Arc<LogBatcher>,
    _handler: Arc<ErrorHandler>,
}

fn stack(server: &MockServer) -> Stack {
    let clock = Arc::new(SystemClock);
    let credentials = Arc::new(CredentialLifecycle::new(
        Arc::new(MemoryStore::new()),
        clock.clone(),
        CredentialConfig::default(),
    ));

    let config = ApiConfig { base_url: server.uri(), ..ApiConfig::default() };
    let api = Arc::new(ApiClient::new(&config, credentials.clone()).expect("api client"));

    let batcher = Arc::new(LogBatcher::new(
        Arc::new(HttpLogTransport::new(api.clone(), "/logs/frontend")),
        Arc::new(StaticEnvironment::default()),
        &LoggingConfig::default(),
        clock,
    ));

    let navigator = Arc::new(HeadlessNavigator::new("/courses/7"));
    let handler = Arc::new(
        ErrorHandler::new(ErrorHandlerConfig { show_notifications: false, ..Default::default() })
            .with_logger(batcher.clone())
            .with_navigator(navigator.clone())
            .with_credentials(credentials.clone()),
    );
    api.attach_error_handler(&handler);

    Stack { api, credentials, navigator, batcher, _handler: handler }
}

#[tokio::test]
async fn test_unauthorized_clears_credential_and_redirects_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/courses"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "expired" })))
        .expect(2)
        .mount(&server)
        .await;

    let stack = stack(&server);
    stack.credentials.set_token("abc", None).unwrap();

    let failure = stack.api.get("/courses", RequestOptions::default()).await.unwrap_err();
    assert_eq!(failure.status_code(), Some(401));
    assert!(stack.credentials.get_token().is_none(), "credential should be cleared");
    assert_eq!(stack.navigator.current_path(), "/login");

    // Already at the entry point: no second redirect
    stack.api.get("/courses", RequestOptions::default()).await.unwrap_err();
    assert_eq!(stack.navigator.redirects(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn test_handled_failure_is_shipped_to_log_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/lessons"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/logs/frontend"))
        .and(body_partial_json(json!({
            "logs": [{ "level": "error", "message": "Error handled" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let stack = stack(&server);

    let failure = stack
        .api
        .post("/lessons", &json!({ "title": "Fractions" }), RequestOptions::default())
        .await
        .unwrap_err();
    assert_eq!(failure.status_code(), Some(500));

    let pending = stack.batcher.pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].level, LogLevel::Error);
    assert_eq!(pending[0].context["errorInfo"]["kind"], json!(ErrorKind::Server.as_str()));

    stack.batcher.flush().await;
    assert!(stack.batcher.is_empty());
}

#[tokio::test]
async fn test_quiet_request_leaves_credential_and_logs_alone() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/sessions/current"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let stack = stack(&server);
    stack.credentials.set_token("abc", None).unwrap();

    stack.api.delete("/sessions/current", RequestOptions::quiet()).await.unwrap_err();

    assert_eq!(stack.credentials.get_token().as_deref(), Some("abc"));
    assert!(stack.batcher.is_empty());
    assert!(stack.navigator.redirects().is_empty());
}

#[tokio::test]
async fn test_health_monitor_against_live_probe() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "healthy" })))
        .mount(&server)
        .await;

    let config = HealthConfig { origin: server.uri(), ..HealthConfig::default() };
    let probe = Arc::new(HttpProbe::new(&config).expect("probe"));
    let monitor = HealthMonitor::new(probe, PageEvents::new(), &config, Arc::new(SystemClock));

    let status = monitor.refresh().await;
    assert!(status.is_healthy);
    assert!(status.server_reachable);
    assert_eq!(status.consecutive_failures, 0);
    assert_eq!(status.server_info, Some(json!({ "status": "healthy" })));
}
