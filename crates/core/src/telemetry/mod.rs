//! Diagnostic log shipping domain

pub mod ports;
pub mod queue;

pub use ports::*;
pub use queue::LogQueue;
