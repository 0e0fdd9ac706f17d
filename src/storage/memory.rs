//! In-memory storage shared by any number of simulated contexts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;

use super::{ContextId, Hub, Storage, StorageError, StorageEvent};

#[derive(Debug, Clone)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
    hub: Hub,
    context: ContextId,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: Arc::new(Mutex::new(HashMap::new())), hub: Hub::new(), context: ContextId::new() }
    }

    /// Open another context over the same entries, like a second tab.
    #[must_use]
    pub fn open_context(&self) -> Self {
        Self { entries: Arc::clone(&self.entries), hub: self.hub.clone(), context: ContextId::new() }
    }

    /// Live subscribers across every context sharing this hub.
    #[cfg(test)]
    pub(crate) fn receiver_count(&self) -> usize {
        self.hub.receiver_count()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage lock poisoned".to_owned()))
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn context(&self) -> ContextId {
        self.context
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let previous = self.lock()?.insert(key.to_owned(), value.to_owned());
        if previous.as_deref() != Some(value) {
            self.hub.notify(key, self.context);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let previous = self.lock()?.remove(key);
        if previous.is_some() {
            self.hub.notify(key, self.context);
        }
        Ok(())
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<StorageEvent>> {
        Some(self.hub.subscribe())
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
