//! Composition of the client components behind one handle.

use crate::activation::{ActivationToken, Activations, Completion};
use crate::analytics::{posts_per_author, AuthorCount};
use crate::auth::CredentialStore;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::favorites::{FavoriteStatus, FavoritesRegistry, Toggled};
use crate::guard::{self, Decision};
use crate::media::{
    HttpImageProbe, ImageIngestionPipeline, ImageProbe, ImageSelection, ImageWarning,
};
use crate::models::{Credential, Post, PostDraft, PostId, Registration, Session};
use crate::posts::{HttpPostStore, PostRepository, RemoteStore};
use crate::storage::{JsonFileStore, KeyValueStore};
use crate::theme::ThemeSettings;

/// Authoring form as filled in by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostForm {
    pub title: String,
    pub description: String,
    pub author: String,
    pub image: Option<ImageSelection>,
}

/// A stored post plus any image warning to surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub post: Post,
    pub warning: Option<ImageWarning>,
}

/// Single handle over credentials, posts, images, favorites and theme.
#[derive(Debug)]
pub struct BlogClient<S: KeyValueStore, R: RemoteStore, P: ImageProbe> {
    credentials: CredentialStore<S>,
    posts: PostRepository<R>,
    images: ImageIngestionPipeline<P>,
    favorites: FavoritesRegistry<S>,
    theme: ThemeSettings<S>,
    activations: Activations,
}

impl BlogClient<JsonFileStore, HttpPostStore, HttpImageProbe> {
    /// Wire the file-backed slots and HTTP collaborators from `config`.
    pub fn open(config: &ClientConfig) -> Result<Self> {
        let store = JsonFileStore::open(&config.data_dir)?;
        let remote = HttpPostStore::new(&config.api_base_url, config.request_timeout)?;
        let probe = HttpImageProbe::new(config.probe_timeout)?;
        tracing::info!(
            "Opening client against {} with data in {}",
            config.api_base_url,
            config.data_dir.display()
        );
        Self::new(store, remote, probe, &config.fallback_image_url)
    }
}

impl<S: KeyValueStore, R: RemoteStore, P: ImageProbe> BlogClient<S, R, P> {
    pub fn new(store: S, remote: R, probe: P, fallback_image_url: &str) -> Result<Self> {
        Ok(Self {
            credentials: CredentialStore::new(store.clone()),
            posts: PostRepository::new(remote),
            images: ImageIngestionPipeline::new(probe, fallback_image_url),
            favorites: FavoritesRegistry::open(store.clone())?,
            theme: ThemeSettings::new(store),
            activations: Activations::new(),
        })
    }

    pub fn register(&self, registration: &Registration) -> Result<Credential> {
        self.credentials.register(registration)
    }

    pub fn login(&self, email: &str, password: &str) -> Result<Session> {
        self.credentials.login(email, password)
    }

    pub fn logout(&self) -> Result<()> {
        self.credentials.logout()
    }

    pub fn session(&self) -> Result<Option<Session>> {
        self.credentials.current_session()
    }

    /// Evaluate the access policy for a requested path.
    pub fn enter(&self, path: &str) -> Result<Decision> {
        let session_present = self.session()?.is_some();
        let registered = self.credentials.has_registered()?;
        Ok(guard::resolve(path, session_present, registered))
    }

    pub const fn activations(&self) -> &Activations {
        &self.activations
    }

    /// Start a view activation; earlier in-flight results become stale.
    pub fn activate(&self) -> ActivationToken {
        self.activations.activate()
    }

    pub const fn images(&self) -> &ImageIngestionPipeline<P> {
        &self.images
    }

    pub const fn posts(&self) -> &PostRepository<R> {
        &self.posts
    }

    pub const fn theme(&self) -> &ThemeSettings<S> {
        &self.theme
    }

    pub async fn list_posts(&mut self) -> Result<&[Post]> {
        self.posts.list().await
    }

    pub async fn list_posts_for(&mut self, token: &ActivationToken) -> Result<Completion<&[Post]>> {
        self.posts.list_for(token).await
    }

    pub async fn post(&self, id: &PostId) -> Result<Post> {
        self.posts.get(id).await
    }

    /// Resolve the form's image and create the post.
    pub async fn publish(&mut self, form: PostForm) -> Result<Published> {
        let session = self.require_session()?;
        let (draft, warning) = self.draft_from(form);
        let post = self.posts.create(draft, &session).await?;
        Ok(Published { post, warning })
    }

    /// Resolve the form's image and update post `id`.
    pub async fn edit(&mut self, id: &PostId, form: PostForm) -> Result<Published> {
        let session = self.require_session()?;
        let (draft, warning) = self.draft_from(form);
        let post = self.posts.update(id, draft, &session).await?;
        Ok(Published { post, warning })
    }

    pub async fn delete(&mut self, id: &PostId) -> Result<()> {
        self.require_session()?;
        self.posts.delete(id).await
    }

    pub fn toggle_favorite(&mut self, post: &Post) -> Result<Toggled> {
        self.favorites.toggle(post)
    }

    pub fn favorites(&self) -> &[Post] {
        self.favorites.list()
    }

    pub fn clear_favorites(&mut self) -> Result<()> {
        self.favorites.clear()
    }

    /// Favorites reconciled against the current post cache.
    pub fn favorite_statuses(&self) -> Vec<FavoriteStatus> {
        self.favorites.resolve(self.posts.cached())
    }

    /// Post counts per author over the cached posts.
    pub fn author_counts(&self) -> Vec<AuthorCount> {
        posts_per_author(self.posts.cached())
    }

    fn require_session(&self) -> Result<Session> {
        self.session()?
            .ok_or_else(|| Error::Forbidden("login required".to_string()))
    }

    fn draft_from(&self, form: PostForm) -> (PostDraft, Option<ImageWarning>) {
        let (image, warning) = match &form.image {
            Some(selection) => {
                let resolved = self.images.resolve(selection);
                (resolved.value, resolved.warning)
            }
            None => (String::new(), None),
        };
        if let Some(warning) = &warning {
            tracing::warn!("{}", warning);
        }

        let draft = PostDraft::new(form.title, form.description, image).with_author(form.author);
        (draft, warning)
    }
}
