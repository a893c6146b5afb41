//! # EduBrain Infrastructure
//!
//! Infrastructure implementations of the core client ports.
//!
//! This crate contains:
//! - HTTP transport and the EduBrain API client
//! - Credential storage adapters and the refresh scheduler
//! - Reachability probing and component health checks
//! - Diagnostic log shipping
//! - Configuration loading from files and environment
//! - Headless host adapters (notifier, navigator, environment)
//!
//! ## Architecture
//! - Implements traits defined in `edubrain-core`
//! - Depends on `edubrain-common`, `edubrain-domain` and `edubrain-core`
//! - Contains all "impure" code (network, filesystem, timers)

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod health;
pub mod host;
pub mod http;
pub mod telemetry;

// Re-export commonly used items
pub use api::ApiClient;
pub use auth::{CredentialRefreshScheduler, ExpiringStore, FileStore, MemoryStore};
pub use errors::{InfraError, IntoRequestFailure};
pub use health::{ApiComponentProbe, ComponentHealthChecker, HealthMonitor, HttpProbe};
pub use host::{HeadlessNavigator, StaticEnvironment, TracingNotifier};
pub use http::{HttpClient, HttpClientBuilder};
pub use telemetry::{ConsoleMirror, HttpLogTransport, LogBatcher};
