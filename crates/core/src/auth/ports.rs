//! Port interfaces for credential persistence

use std::time::Duration;

use edubrain_domain::Result;

/// String key/value persistence
///
/// Implementations are synchronous; they back onto in-process maps, small
/// files or host storage that answers immediately.
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when absent or expired
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, optionally expiring after `ttl`
    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Delete a value; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}
