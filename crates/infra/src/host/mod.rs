//! Host adapters for a headless client
//!
//! A desktop or web shell supplies its own [`edubrain_core::Notifier`],
//! [`edubrain_core::Navigator`] and [`edubrain_core::ClientEnvironment`];
//! these implementations route everything through `tracing` and in-memory
//! state so the client runs without a UI.

pub mod environment;
pub mod navigator;
pub mod notifier;

pub use environment::StaticEnvironment;
pub use navigator::HeadlessNavigator;
pub use notifier::TracingNotifier;
