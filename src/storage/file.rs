//! Directory-backed storage: one file per key.
//!
//! TRADE-OFFS
//! ==========
//! Writes land in a uniquely named temp file and are renamed over the slot,
//! so a reader sees either the old or the new value, never a torn one.
//! Change notifications only reach contexts opened from the same
//! `FileStorage` in this process; other processes see new values on their
//! next read.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::broadcast;
use uuid::Uuid;

use super::{ContextId, Hub, Storage, StorageError, StorageEvent};

const SLOT_EXTENSION: &str = "slot";

#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
    hub: Hub,
    context: ContextId,
}

impl FileStorage {
    /// Open (creating if needed) a storage directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        tracing::debug!(root = %root.display(), "file storage opened");
        Ok(Self { root, hub: Hub::new(), context: ContextId::new() })
    }

    /// Open another context over the same directory.
    #[must_use]
    pub fn open_context(&self) -> Self {
        Self { root: self.root.clone(), hub: self.hub.clone(), context: ContextId::new() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{SLOT_EXTENSION}", slot_name(key)))
    }
}

/// Map a key onto a safe file stem.
pub(crate) fn slot_name(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

impl Storage for FileStorage {
    fn context(&self) -> ContextId {
        self.context
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.slot_path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if matches!(self.get(key), Ok(Some(current)) if current == value) {
            return Ok(());
        }
        let target = self.slot_path(key);
        let staging = self
            .root
            .join(format!(".{}.{}.tmp", slot_name(key), Uuid::new_v4().simple()));
        let staged = fs::write(&staging, value).and_then(|()| fs::rename(&staging, &target));
        if let Err(e) = staged {
            // A failed write can leave a partial staging file behind too.
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }
        self.hub.notify(key, self.context);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.slot_path(key)) {
            Ok(()) => {
                self.hub.notify(key, self.context);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<StorageEvent>> {
        Some(self.hub.subscribe())
    }
}

#[cfg(test)]
#[path = "file_test.rs"]
mod tests;
