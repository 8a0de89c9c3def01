//! In-process store used by tests and ephemeral clients.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{KeyValueStore, StorageKey};
use crate::error::{Error, Result};

/// Shared in-memory slots. Clones observe the same values.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Arc<Mutex<HashMap<StorageKey, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> Result<MutexGuard<'_, HashMap<StorageKey, String>>> {
        self.slots
            .lock()
            .map_err(|_| Error::Storage("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: StorageKey) -> Result<Option<String>> {
        Ok(self.slots()?.get(&key).cloned())
    }

    fn set(&self, key: StorageKey, value: &str) -> Result<()> {
        self.slots()?.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> Result<()> {
        self.slots()?.remove(&key);
        Ok(())
    }
}
