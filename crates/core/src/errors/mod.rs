//! Failure classification and handling

pub mod classifier;
pub mod handler;
pub mod ports;

pub use classifier::ErrorClassifier;
pub use handler::ErrorHandler;
pub use ports::{ErrorCallback, Navigator, Notifier};
