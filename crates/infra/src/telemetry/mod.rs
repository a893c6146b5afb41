//! Diagnostic log shipping
//!
//! - [`LogBatcher`]: queue with threshold, timer and unload flushes
//! - [`HttpLogTransport`]: normal and beacon delivery through the API client
//! - [`ConsoleMirror`]: forwards records to `tracing` as well

pub mod batcher;
pub mod console;
pub mod transport;

pub use batcher::LogBatcher;
pub use console::ConsoleMirror;
pub use transport::HttpLogTransport;
