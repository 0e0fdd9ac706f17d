//! Durable key/value storage capability.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session layer never touches ambient globals; it is handed an
//! `Arc<dyn Storage>` instead. Each handle belongs to one execution context
//! (a "tab"). Handles opened over the same backing store share a notification
//! hub, and every change is broadcast tagged with its origin context so
//! observers can ignore their own writes.

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::ErrorCode;

const EVENT_CAPACITY: usize = 64;

/// Identity of one execution context sharing a backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(Uuid);

impl ContextId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

/// A change to one key, fired after the write or removal lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub origin: ContextId,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl ErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "E_STORAGE_IO",
            Self::Unavailable(_) => "E_STORAGE_UNAVAILABLE",
        }
    }
}

/// Synchronous string slots, in the manner of browser `localStorage`.
pub trait Storage: Send + Sync {
    /// Context this handle writes as.
    fn context(&self) -> ContextId;

    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value under `key` in a single atomic write.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Change notifications for every context sharing this store, or `None`
    /// when the store cannot report changes.
    fn subscribe(&self) -> Option<broadcast::Receiver<StorageEvent>> {
        None
    }
}

// =============================================================================
// NOTIFICATION HUB
// =============================================================================

#[derive(Debug, Clone)]
pub(crate) struct Hub {
    tx: broadcast::Sender<StorageEvent>,
}

impl Hub {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub(crate) fn notify(&self, key: &str, origin: ContextId) {
        // No receivers is the common case outside an active observer.
        let _ = self.tx.send(StorageEvent { key: key.to_owned(), origin });
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.tx.subscribe()
    }

    #[cfg(test)]
    pub(crate) fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
