//! Reachability monitoring domain

pub mod ports;
pub mod quality;

pub use ports::*;
pub use quality::ConnectionQuality;
