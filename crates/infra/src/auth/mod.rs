//! Credential storage adapters and refresh scheduling

pub mod scheduler;
pub mod storage;

pub use scheduler::CredentialRefreshScheduler;
pub use storage::{ExpiringStore, FileStore, MemoryStore};
