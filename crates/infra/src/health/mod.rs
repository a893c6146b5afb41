//! Reachability monitoring
//!
//! - [`HealthMonitor`]: periodic probe with online/offline handling
//! - [`HttpProbe`]: no-cache `GET` against the health endpoint
//! - [`ComponentHealthChecker`]: concurrent checks of named components

pub mod components;
pub mod monitor;
pub mod probe;

pub use components::ComponentHealthChecker;
pub use monitor::HealthMonitor;
pub use probe::{ApiComponentProbe, HttpProbe};
