//! # EduBrain Domain
//!
//! Data model shared by every layer of the EduBrain client.
//!
//! This crate contains:
//! - Classification verdicts, request failures, health snapshots,
//!   credentials, log records and notifications
//! - The `ClientError` type and `Result` alias
//! - Configuration structures with defaults
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other EduBrain crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
