//! # EduBrain Core
//!
//! Pure resilience logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for every collaborator
//! - Failure classification and handling
//! - Credential lifecycle rules
//! - The page event hub and the log queue
//!
//! ## Architecture Principles
//! - Only depends on `edubrain-common` and `edubrain-domain`
//! - No HTTP, storage or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod auth;
pub mod errors;
pub mod events;
pub mod health;
pub mod telemetry;

// Re-export specific items to avoid ambiguity
pub use auth::{CredentialLifecycle, KeyValueStore};
pub use errors::{ErrorCallback, ErrorClassifier, ErrorHandler, Navigator, Notifier};
pub use events::{PageEvent, PageEventListener, PageEvents};
pub use health::{
    ComponentProbe, ConnectionQuality, HealthStatusListener, NetworkStatus, ReachabilityProbe,
};
pub use telemetry::{ClientEnvironment, LogFacade, LogQueue, LogTransport};
