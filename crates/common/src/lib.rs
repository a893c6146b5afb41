//! Modular common utilities shared across EduBrain client crates.
//!
//! - [`time`]: clock abstraction with a system implementation and a
//!   manually advanced mock for deterministic tests
//! - [`lifecycle`]: subscription handles returned by listener registries and
//!   sets that release them together at teardown, plus the background worker
//!   slot used by every periodic loop

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod lifecycle;
pub mod time;

pub use lifecycle::{BackgroundWorker, Subscription, SubscriptionSet, WorkerError};
pub use time::{Clock, MockClock, SharedClock, SystemClock};
