//! Listener lifecycle utilities.
//!
//! Registries hand out a [`Subscription`] for every listener they accept.
//! Components collect them in a [`SubscriptionSet`] and release them together
//! when they stop. Background loops run inside a [`BackgroundWorker`] that
//! owns the task handle and its cancellation token.

pub mod subscription;
pub mod worker;

pub use subscription::{Subscription, SubscriptionSet};
pub use worker::{BackgroundWorker, WorkerError};
