//! # EduBrain App
//!
//! Application layer - context wiring and process setup.
//!
//! This crate contains:
//! - Client context (dependency injection)
//! - Tracing subscriber initialisation
//! - Health snapshots across every component
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core`, and `infra`
//! - Wires the ports in `core` to the adapters in `infra`

pub mod context;
pub mod utils;

// Re-export for convenience
pub use context::{ClientContext, HostAdapters};
pub use utils::health::{ClientHealth, TaskState};
