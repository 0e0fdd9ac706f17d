//! Persisted session record and post-login redirect target.
//!
//! SYSTEM CONTEXT
//! ==============
//! Two independent slots in the injected storage: one JSON-serialized
//! [`AuthSessionRecord`], one plain redirect path. The gateway reads the
//! record to attach credentials and clears it on 401; the login flow writes
//! it and consumes the redirect target.
//!
//! ERROR HANDLING
//! ==============
//! Storage faults never reach callers. A read fault or unparseable content is
//! "no session"; write faults are logged and dropped.

pub mod redirect;

pub use redirect::RedirectStore;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{GatewayConfig, SESSION_KEY};
use crate::storage::{ContextId, Storage};

// =============================================================================
// RECORDS
// =============================================================================

/// The persisted credential bundle for the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSessionRecord {
    pub token: String,
    pub login_type: String,
    /// Server-issued expiry. Advisory only; never checked client-side.
    pub expire: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl AuthSessionRecord {
    #[must_use]
    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }
}

/// Credentials returned by the login and register endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionGrant {
    pub token: String,
    pub login_type: String,
    pub expire: i64,
}

// =============================================================================
// SESSION STORE
// =============================================================================

/// Reads and writes the session record slot.
#[derive(Clone)]
pub struct SessionStore {
    storage: Option<Arc<dyn Storage>>,
    key: String,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("key", &self.key)
            .field("attached", &self.storage.is_some())
            .finish()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, config: &GatewayConfig) -> Self {
        Self { storage: Some(storage), key: config.session_key.clone() }
    }

    /// A store with no storage behind it: reads are empty, writes are no-ops.
    #[must_use]
    pub fn detached() -> Self {
        Self { storage: None, key: SESSION_KEY.to_owned() }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn storage(&self) -> Option<&Arc<dyn Storage>> {
        self.storage.as_ref()
    }

    #[must_use]
    pub fn context(&self) -> Option<ContextId> {
        self.storage.as_ref().map(|s| s.context())
    }

    /// Current record, or `None` if absent, unreadable or malformed.
    #[must_use]
    pub fn read(&self) -> Option<AuthSessionRecord> {
        let storage = self.storage.as_ref()?;
        let raw = match storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "session read failed");
                return None;
            }
        };
        if raw.is_empty() {
            return None;
        }
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!(key = %self.key, error = %e, "stored session is malformed");
                None
            }
        }
    }

    /// Replace the stored record wholesale.
    pub fn write(&self, record: &AuthSessionRecord) {
        let Some(storage) = self.storage.as_ref() else {
            return;
        };
        let raw = match serde_json::to_string(record) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "session record encode failed");
                return;
            }
        };
        if let Err(e) = storage.set(&self.key, &raw) {
            tracing::warn!(key = %self.key, error = %e, "session write failed");
        }
    }

    pub fn clear(&self) {
        let Some(storage) = self.storage.as_ref() else {
            return;
        };
        if let Err(e) = storage.remove(&self.key) {
            tracing::warn!(key = %self.key, error = %e, "session clear failed");
        }
    }

    /// Persist a fresh record built from a login/register grant.
    pub fn establish(
        &self,
        grant: SessionGrant,
        username: Option<String>,
        display_name: Option<String>,
    ) -> AuthSessionRecord {
        let record = AuthSessionRecord {
            token: grant.token,
            login_type: grant.login_type,
            expire: grant.expire,
            username,
            display_name,
        };
        self.write(&record);
        tracing::info!(login_type = %record.login_type, "session established");
        record
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
