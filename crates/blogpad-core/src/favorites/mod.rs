//! Locally curated favorites.
//!
//! Each entry is a full snapshot of the post taken when it was favorited.
//! Snapshots are never refreshed behind the user's back; [`FavoritesRegistry::resolve`]
//! compares them against the live post cache and reports entries that have
//! changed or disappeared instead of silently serving stale data.

use crate::error::{Error, Result};
use crate::models::{Post, PostId};
use crate::storage::{load_json, save_json, KeyValueStore, StorageKey};

/// Outcome of [`FavoritesRegistry::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

/// A favorite reconciled against the live posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoriteStatus {
    /// Snapshot matches the live post.
    Live(Post),
    /// The live post was edited after it was favorited.
    Changed { snapshot: Post, current: Post },
    /// The post no longer exists in the live collection.
    Orphaned(Post),
}

impl FavoriteStatus {
    pub const fn id(&self) -> &PostId {
        match self {
            Self::Live(post) | Self::Orphaned(post) => &post.id,
            Self::Changed { snapshot, .. } => &snapshot.id,
        }
    }

    pub const fn is_orphaned(&self) -> bool {
        matches!(self, Self::Orphaned(_))
    }
}

/// Ordered set of post snapshots keyed by post id.
#[derive(Debug, Clone)]
pub struct FavoritesRegistry<S: KeyValueStore> {
    store: S,
    entries: Vec<Post>,
}

impl<S: KeyValueStore> FavoritesRegistry<S> {
    /// Load the persisted favorites. An unreadable slot starts empty.
    pub fn open(store: S) -> Result<Self> {
        let entries = match load_json::<Vec<Post>, _>(&store, StorageKey::Favorites) {
            Ok(entries) => entries.unwrap_or_default(),
            Err(Error::Serialization(error)) => {
                tracing::warn!("Ignoring unreadable favorites: {}", error);
                Vec::new()
            }
            Err(error) => return Err(error),
        };
        Ok(Self { store, entries })
    }

    /// Remove the entry for `post.id` if present, otherwise add a snapshot.
    pub fn toggle(&mut self, post: &Post) -> Result<Toggled> {
        let mut entries = self.entries.clone();
        let toggled = if let Some(index) = entries.iter().position(|entry| entry.id == post.id) {
            entries.remove(index);
            Toggled::Removed
        } else {
            entries.push(post.clone());
            Toggled::Added
        };

        self.persist(entries)?;
        tracing::debug!("Favorite {} {:?}", post.id, toggled);
        Ok(toggled)
    }

    /// Snapshots in insertion order.
    pub fn list(&self) -> &[Post] {
        &self.entries
    }

    pub fn clear(&mut self) -> Result<()> {
        self.persist(Vec::new())?;
        tracing::info!("Cleared favorites");
        Ok(())
    }

    pub fn contains(&self, id: &PostId) -> bool {
        self.entries.iter().any(|entry| &entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reconcile every snapshot against `live` posts, in insertion order.
    pub fn resolve(&self, live: &[Post]) -> Vec<FavoriteStatus> {
        self.entries
            .iter()
            .map(|snapshot| match live.iter().find(|post| post.id == snapshot.id) {
                Some(current) if current == snapshot => FavoriteStatus::Live(current.clone()),
                Some(current) => FavoriteStatus::Changed {
                    snapshot: snapshot.clone(),
                    current: current.clone(),
                },
                None => FavoriteStatus::Orphaned(snapshot.clone()),
            })
            .collect()
    }

    fn persist(&mut self, entries: Vec<Post>) -> Result<()> {
        save_json(&self.store, StorageKey::Favorites, &entries)?;
        self.entries = entries;
        Ok(())
    }
}
