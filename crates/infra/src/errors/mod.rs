//! Infrastructure error conversions

pub mod conversions;

pub use conversions::{InfraError, IntoRequestFailure};
