//! Access credential with wall-clock expiry

use serde::{Deserialize, Serialize};

/// Bearer credential as issued locally.
///
/// Timestamps are milliseconds since the UNIX epoch, matching what the
/// persistence layer stores under the expiry key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub token: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl Credential {
    /// Issue `token` at `now_millis`, valid for `ttl_secs` seconds.
    pub fn issue(token: impl Into<String>, now_millis: i64, ttl_secs: u64) -> Self {
        let ttl_millis = i64::try_from(ttl_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        Self {
            token: token.into(),
            issued_at: now_millis,
            expires_at: now_millis.saturating_add(ttl_millis),
        }
    }

    /// Expired strictly after `expires_at`.
    pub const fn is_expired_at(&self, now_millis: i64) -> bool {
        now_millis > self.expires_at
    }

    /// Whole seconds left, saturating at zero.
    pub fn remaining_seconds_at(&self, now_millis: i64) -> u64 {
        remaining_seconds(self.expires_at, now_millis)
    }
}

/// Whole seconds between `now_millis` and `expires_at`, saturating at zero.
pub fn remaining_seconds(expires_at: i64, now_millis: i64) -> u64 {
    u64::try_from(expires_at.saturating_sub(now_millis) / 1000).unwrap_or(0)
}
