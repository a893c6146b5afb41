//! Application-level helpers: tracing setup and health snapshots

pub mod health;
pub mod logging;
