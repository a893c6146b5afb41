//! Credential lifecycle: storage, expiry and local refresh
//!
//! The token lives in a primary store with a secondary store as fallback
//! (mirroring a durable store next to a short-lived one). Expiry is recorded
//! as epoch milliseconds under its own key.
//!
//! A token without a recorded expiry is treated as valid. Refreshing only
//! pushes the local expiry forward; the server is never contacted.

use std::sync::Arc;

use edubrain_common::SharedClock;
use edubrain_domain::types::credential::remaining_seconds;
use edubrain_domain::{Credential, CredentialConfig, Result};
use tracing::{debug, info, warn};

use super::ports::KeyValueStore;

/// Owns the access credential and its expiry.
pub struct CredentialLifecycle {
    primary: Arc<dyn KeyValueStore>,
    secondary: Option<Arc<dyn KeyValueStore>>,
    clock: SharedClock,
    config: CredentialConfig,
}

impl CredentialLifecycle {
    pub fn new(
        primary: Arc<dyn KeyValueStore>,
        clock: SharedClock,
        config: CredentialConfig,
    ) -> Self {
        Self { primary, secondary: None, clock, config }
    }

    /// Add a fallback store consulted when the primary has no token.
    #[must_use]
    pub fn with_secondary(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.secondary = Some(store);
        self
    }

    pub const fn config(&self) -> &CredentialConfig {
        &self.config
    }

    /// Current token, primary store first.
    pub fn get_token(&self) -> Option<String> {
        self.read(&self.config.token_key)
    }

    /// Store `token` with an expiry `ttl_secs` from now (default TTL if `None`).
    pub fn set_token(&self, token: &str, ttl_secs: Option<u64>) -> Result<Credential> {
        let ttl = ttl_secs.unwrap_or(self.config.default_ttl_secs);
        let credential = Credential::issue(token, self.clock.millis_since_epoch(), ttl);
        let expires_at = credential.expires_at.to_string();

        self.primary.set(&self.config.token_key, token, None)?;
        self.primary.set(&self.config.expiry_key, &expires_at, None)?;

        if let Some(secondary) = &self.secondary {
            let lifetime = Some(self.config.secondary_ttl());
            secondary.set(&self.config.token_key, token, lifetime)?;
            secondary.set(&self.config.expiry_key, &expires_at, lifetime)?;
        }

        debug!(ttl_secs = ttl, expires_at = credential.expires_at, "credential stored");
        Ok(credential)
    }

    /// Remove token and expiry from every store.
    ///
    /// Store failures are logged; the remaining keys are still removed.
    pub fn clear(&self) {
        let stores = std::iter::once(&self.primary).chain(self.secondary.as_ref());
        for store in stores {
            for key in [&self.config.token_key, &self.config.expiry_key] {
                if let Err(err) = store.remove(key) {
                    warn!(key = %key, error = %err, "failed to remove credential entry");
                }
            }
        }
        info!("credential cleared");
    }

    /// Recorded expiry in epoch milliseconds.
    pub fn expires_at(&self) -> Option<i64> {
        let raw = self.read(&self.config.expiry_key)?;
        match raw.trim().parse::<i64>() {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(value = %raw, error = %err, "ignoring unparsable credential expiry");
                None
            }
        }
    }

    /// True without a token; false for a token with no recorded expiry.
    pub fn is_expired(&self) -> bool {
        if self.get_token().is_none() {
            return true;
        }
        self.expires_at().is_some_and(|expires_at| self.clock.millis_since_epoch() > expires_at)
    }

    pub fn is_valid(&self) -> bool {
        self.get_token().is_some() && !self.is_expired()
    }

    /// Whole seconds until expiry, `None` without a recorded expiry.
    pub fn remaining_seconds(&self) -> Option<u64> {
        let now = self.clock.millis_since_epoch();
        self.expires_at().map(|expires_at| remaining_seconds(expires_at, now))
    }

    /// Re-issue the current token with a fresh TTL.
    ///
    /// Returns `None` when there is no token to extend.
    pub fn refresh_expiry(&self, ttl_secs: Option<u64>) -> Result<Option<Credential>> {
        match self.get_token() {
            Some(token) => self.set_token(&token, ttl_secs).map(Some),
            None => Ok(None),
        }
    }

    /// Extend the token when it is close to expiring.
    ///
    /// Applies only while `0 < remaining < refresh_threshold`. The extension
    /// is local; the server-side session is not renewed.
    pub fn maybe_auto_refresh(&self) -> Result<Option<Credential>> {
        match self.remaining_seconds() {
            Some(remaining) if remaining > 0 && remaining < self.config.refresh_threshold_secs => {
                let refreshed = self.refresh_expiry(None)?;
                if refreshed.is_some() {
                    info!(remaining_secs = remaining, "credential expiry extended");
                }
                Ok(refreshed)
            }
            _ => Ok(None),
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        if let Some(value) = read_store(self.primary.as_ref(), key) {
            return Some(value);
        }
        self.secondary.as_deref().and_then(|store| read_store(store, key))
    }
}

fn read_store(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value.filter(|v| !v.is_empty()),
        Err(err) => {
            warn!(key, error = %err, "credential store read failed");
            None
        }
    }
}
