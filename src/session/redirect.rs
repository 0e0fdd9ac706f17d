//! Post-login redirect target slot.

use std::sync::Arc;

use crate::config::{GatewayConfig, REDIRECT_KEY};
use crate::storage::Storage;

/// Best-effort store for the path the login flow should return to.
#[derive(Clone)]
pub struct RedirectStore {
    storage: Option<Arc<dyn Storage>>,
    key: String,
}

impl RedirectStore {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, config: &GatewayConfig) -> Self {
        Self { storage: Some(storage), key: config.redirect_key.clone() }
    }

    #[must_use]
    pub fn detached() -> Self {
        Self { storage: None, key: REDIRECT_KEY.to_owned() }
    }

    /// Record `target`. Failures are swallowed.
    pub fn record(&self, target: &str) {
        let Some(storage) = self.storage.as_ref() else {
            return;
        };
        if let Err(e) = storage.set(&self.key, target) {
            tracing::debug!(key = %self.key, error = %e, "redirect target not recorded");
        }
    }

    #[must_use]
    pub fn peek(&self) -> Option<String> {
        let storage = self.storage.as_ref()?;
        storage
            .get(&self.key)
            .ok()
            .flatten()
            .filter(|target| !target.is_empty())
    }

    /// Read and clear the target.
    #[must_use]
    pub fn take(&self) -> Option<String> {
        let storage = self.storage.as_ref()?;
        let target = storage.get(&self.key).ok().flatten()?;
        // Clear even an empty slot so it cannot linger.
        if let Err(e) = storage.remove(&self.key) {
            tracing::debug!(key = %self.key, error = %e, "redirect target not cleared");
        }
        Some(target).filter(|target| !target.is_empty())
    }
}

#[cfg(test)]
#[path = "redirect_test.rs"]
mod tests;
