//! Credential lifecycle domain

pub mod credential;
pub mod ports;

pub use credential::CredentialLifecycle;
pub use ports::KeyValueStore;
