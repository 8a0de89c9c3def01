//! Persisted key-value slots.
//!
//! The client keeps a handful of process-wide values (credential, session,
//! favorites, theme) that survive restarts. They are reached through the
//! [`KeyValueStore`] trait so tests can substitute [`MemoryStore`].

mod file;
mod memory;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Named persistence slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Credential,
    Session,
    Favorites,
    Theme,
}

impl StorageKey {
    pub const ALL: [Self; 4] = [Self::Credential, Self::Session, Self::Favorites, Self::Theme];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Credential => "authData",
            Self::Session => "loginData",
            Self::Favorites => "favorites",
            Self::Theme => "theme",
        }
    }
}

/// Raw string storage over typed keys.
pub trait KeyValueStore: Clone + Send + Sync + 'static {
    fn get(&self, key: StorageKey) -> Result<Option<String>>;
    fn set(&self, key: StorageKey, value: &str) -> Result<()>;
    fn remove(&self, key: StorageKey) -> Result<()>;
}

/// Read and deserialize a JSON slot.
pub fn load_json<T, S>(store: &S, key: StorageKey) -> Result<Option<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore,
{
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serialize and write a JSON slot.
pub fn save_json<T, S>(store: &S, key: StorageKey, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore,
{
    let serialized = serde_json::to_string(value)?;
    store.set(key, &serialized)
}
