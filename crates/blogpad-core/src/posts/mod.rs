//! Post repository synchronized against the remote content store.
//!
//! Every mutation round-trips to the remote store first; the in-memory cache
//! only reflects the last successful list/create/update/delete. Concurrent
//! edits resolve last-write-wins at the remote store.

mod http;
mod memory;
mod wire;

use crate::activation::{ActivationToken, Completion};
use crate::error::{Error, Result};
use crate::models::{Post, PostDraft, PostId, Session};
use crate::util::unix_timestamp_millis;

pub use http::HttpPostStore;
pub use memory::MemoryPostStore;
pub use wire::check_record;

/// Request/response access to the remote post collection.
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    /// `GET /posts`, in remote-defined order
    async fn list(&self) -> Result<Vec<Post>>;

    /// `GET /posts/{id}`; `Error::NotFound` when absent
    async fn get(&self, id: &PostId) -> Result<Post>;

    /// `POST /posts`
    async fn create(&self, post: &Post) -> Result<Post>;

    /// `PUT /posts/{id}`; `Error::NotFound` when absent
    async fn update(&self, post: &Post) -> Result<Post>;

    /// `DELETE /posts/{id}`; `Error::NotFound` when absent
    async fn delete(&self, id: &PostId) -> Result<()>;
}

/// CRUD façade over a [`RemoteStore`] with a local cache.
#[derive(Debug)]
pub struct PostRepository<R: RemoteStore> {
    remote: R,
    cache: Vec<Post>,
}

impl<R: RemoteStore> PostRepository<R> {
    pub const fn new(remote: R) -> Self {
        Self {
            remote,
            cache: Vec::new(),
        }
    }

    pub const fn remote(&self) -> &R {
        &self.remote
    }

    /// Posts from the last successful remote interaction.
    pub fn cached(&self) -> &[Post] {
        &self.cache
    }

    pub fn cached_post(&self, id: &PostId) -> Option<&Post> {
        self.cache.iter().find(|post| &post.id == id)
    }

    /// Fetch all posts and replace the cache wholesale.
    ///
    /// On failure the previous cache is kept.
    pub async fn list(&mut self) -> Result<&[Post]> {
        let posts = self.fetch_all().await?;
        self.replace_cache(posts);
        Ok(&self.cache)
    }

    /// Like [`Self::list`], but only applies the result if `token` is still
    /// current when it arrives.
    ///
    /// A stale token discards failures as well as results.
    pub async fn list_for(&mut self, token: &ActivationToken) -> Result<Completion<&[Post]>> {
        let fetched = self.fetch_all().await;
        if !token.is_current() {
            tracing::debug!("Discarding post list for a torn-down view");
            return Ok(Completion::Discarded);
        }
        self.replace_cache(fetched?);
        Ok(Completion::Applied(&self.cache))
    }

    /// Fetch a single post without touching the cache.
    pub async fn get(&self, id: &PostId) -> Result<Post> {
        let post = self.remote.get(id).await?;
        check_record(&post)?;
        Ok(post)
    }

    /// Fetch a single post for a view that may have gone away meanwhile.
    pub async fn get_for(&self, id: &PostId, token: &ActivationToken) -> Result<Completion<Post>> {
        let fetched = self.get(id).await;
        if !token.is_current() {
            tracing::debug!("Discarding post {} for a torn-down view", id);
            return Ok(Completion::Discarded);
        }
        fetched.map(Completion::Applied)
    }

    /// Validate `draft`, submit it as a new post owned by `session`, and
    /// append the stored record to the cache.
    pub async fn create(&mut self, draft: PostDraft, session: &Session) -> Result<Post> {
        let draft = draft.validated()?;
        let post = Post::from_draft(draft, session, unix_timestamp_millis());

        let created = self.remote.create(&post).await?;
        check_record(&created)?;
        tracing::info!("Created post {} by {}", created.id, session.username);
        self.cache.push(created.clone());
        Ok(created)
    }

    /// Apply `draft` to the remote post `id` if `session` owns it.
    ///
    /// Fails with `Forbidden` for someone else's post; the cache is left
    /// untouched on every failure.
    pub async fn update(&mut self, id: &PostId, draft: PostDraft, session: &Session) -> Result<Post> {
        let draft = draft.validated()?;
        let existing = self.get(id).await?;
        if !existing.is_owned_by(session) {
            tracing::warn!("{} attempted to edit post {} they do not own", session.username, id);
            return Err(Error::Forbidden(format!(
                "post {id} belongs to another author"
            )));
        }

        let updated = self.remote.update(&existing.with_edits(draft)).await?;
        check_record(&updated)?;
        tracing::info!("Updated post {}", updated.id);
        match self.cache.iter_mut().find(|post| post.id == updated.id) {
            Some(slot) => *slot = updated.clone(),
            None => self.cache.push(updated.clone()),
        }
        Ok(updated)
    }

    /// Delete the remote post `id` and drop it from the cache.
    ///
    /// Deleting an id the remote store no longer has reports `NotFound` and
    /// leaves the cache as it was.
    pub async fn delete(&mut self, id: &PostId) -> Result<()> {
        self.remote.delete(id).await?;
        self.cache.retain(|post| &post.id != id);
        tracing::info!("Deleted post {}", id);
        Ok(())
    }

    async fn fetch_all(&self) -> Result<Vec<Post>> {
        let posts = self.remote.list().await?;
        for post in &posts {
            check_record(post)?;
        }
        Ok(posts)
    }

    fn replace_cache(&mut self, posts: Vec<Post>) {
        tracing::debug!("Replacing post cache with {} posts", posts.len());
        self.cache = posts;
    }
}
