//! Persisted light/dark theme preference.

use crate::error::Result;
use crate::models::ThemeMode;
use crate::storage::{KeyValueStore, StorageKey};

#[derive(Debug, Clone)]
pub struct ThemeSettings<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ThemeSettings<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Stored theme; missing or unrecognised values read as light.
    pub fn current(&self) -> Result<ThemeMode> {
        Ok(self
            .store
            .get(StorageKey::Theme)?
            .and_then(|raw| ThemeMode::parse(&raw))
            .unwrap_or_default())
    }

    pub fn set(&self, theme: ThemeMode) -> Result<()> {
        self.store.set(StorageKey::Theme, theme.as_str())
    }

    /// Flip between light and dark and persist the result.
    pub fn toggle(&self) -> Result<ThemeMode> {
        let next = self.current()?.toggled();
        self.set(next)?;
        Ok(next)
    }
}
