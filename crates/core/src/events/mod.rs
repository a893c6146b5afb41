//! Host page events (connectivity, visibility, teardown)

pub mod hub;

pub use hub::{PageEvent, PageEventListener, PageEvents};
