//! In-process remote store for tests and offline demos.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::RemoteStore;
use crate::error::{Error, Result};
use crate::models::{Post, PostId};

/// Remote collection held in memory. Clones share the same collection.
///
/// `set_offline(true)` makes every call fail with `Error::Network`.
#[derive(Debug, Clone, Default)]
pub struct MemoryPostStore {
    posts: Arc<Mutex<Vec<Post>>>,
    offline: Arc<AtomicBool>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Current remote contents.
    pub fn snapshot(&self) -> Vec<Post> {
        self.posts
            .lock()
            .map(|posts| posts.clone())
            .unwrap_or_default()
    }

    /// Add a record as another client would, bypassing any repository.
    pub fn insert_directly(&self, post: Post) {
        if let Ok(mut posts) = self.posts.lock() {
            posts.push(post);
        }
    }

    /// Remove a record as another client would, bypassing any repository.
    pub fn remove_directly(&self, id: &PostId) {
        if let Ok(mut posts) = self.posts.lock() {
            posts.retain(|post| &post.id != id);
        }
    }

    fn posts(&self) -> Result<MutexGuard<'_, Vec<Post>>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network("remote store is unreachable".to_string()));
        }
        self.posts
            .lock()
            .map_err(|_| Error::Network("remote store lock poisoned".to_string()))
    }
}

impl RemoteStore for MemoryPostStore {
    async fn list(&self) -> Result<Vec<Post>> {
        Ok(self.posts()?.clone())
    }

    async fn get(&self, id: &PostId) -> Result<Post> {
        self.posts()?
            .iter()
            .find(|post| &post.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn create(&self, post: &Post) -> Result<Post> {
        let mut posts = self.posts()?;
        if posts.iter().any(|existing| existing.id == post.id) {
            return Err(Error::InvalidInput(format!("post {} already exists", post.id)));
        }
        posts.push(post.clone());
        Ok(post.clone())
    }

    async fn update(&self, post: &Post) -> Result<Post> {
        let mut posts = self.posts()?;
        let slot = posts
            .iter_mut()
            .find(|existing| existing.id == post.id)
            .ok_or_else(|| Error::NotFound(post.id.to_string()))?;
        *slot = post.clone();
        Ok(post.clone())
    }

    async fn delete(&self, id: &PostId) -> Result<()> {
        let mut posts = self.posts()?;
        let before = posts.len();
        posts.retain(|post| &post.id != id);
        if posts.len() == before {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }
}
