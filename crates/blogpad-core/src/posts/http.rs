//! Remote store reached over HTTP with JSON bodies.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};

use super::wire::{parse_post, parse_post_list};
use super::RemoteStore;
use crate::error::{Error, Result};
use crate::models::{Post, PostId};
use crate::util::{error_excerpt, is_http_url};

/// HTTP client for the `/posts` collection.
#[derive(Debug, Clone)]
pub struct HttpPostStore {
    base_url: String,
    client: Client,
}

impl HttpPostStore {
    /// Builds a client for an explicit API base URL.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(&base_url.into())?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| Error::Network(format!("Failed to construct HTTP client: {error}")))?;
        Ok(Self { base_url, client })
    }

    /// Returns the base URL this client was configured with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/posts", self.base_url)
    }

    fn item_url(&self, id: &PostId) -> String {
        format!("{}/posts/{}", self.base_url, urlencoding::encode(id.as_str()))
    }
}

impl RemoteStore for HttpPostStore {
    async fn list(&self) -> Result<Vec<Post>> {
        let response = self
            .client
            .get(self.collection_url())
            .header("Accept", "application/json")
            .send()
            .await?;
        let body = ensure_success(response, None).await?.text().await?;
        parse_post_list(&body)
    }

    async fn get(&self, id: &PostId) -> Result<Post> {
        let response = self
            .client
            .get(self.item_url(id))
            .header("Accept", "application/json")
            .send()
            .await?;
        let body = ensure_success(response, Some(id)).await?.text().await?;
        parse_post(&body)
    }

    async fn create(&self, post: &Post) -> Result<Post> {
        let response = self
            .client
            .post(self.collection_url())
            .header("Accept", "application/json")
            .json(post)
            .send()
            .await?;
        let body = ensure_success(response, None).await?.text().await?;
        parse_post(&body)
    }

    async fn update(&self, post: &Post) -> Result<Post> {
        let response = self
            .client
            .put(self.item_url(&post.id))
            .header("Accept", "application/json")
            .json(post)
            .send()
            .await?;
        let body = ensure_success(response, Some(&post.id)).await?.text().await?;
        parse_post(&body)
    }

    async fn delete(&self, id: &PostId) -> Result<()> {
        let response = self.client.delete(self.item_url(id)).send().await?;
        ensure_success(response, Some(id)).await?;
        Ok(())
    }
}

async fn ensure_success(response: Response, id: Option<&PostId>) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(Error::NotFound(
            id.map_or_else(|| response.url().path().to_string(), ToString::to_string),
        ));
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Network(parse_api_error(status, &body)))
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    let trimmed = error_excerpt(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

pub(crate) fn normalize_base_url(raw: &str) -> Result<String> {
    let base = raw.trim().trim_end_matches('/').to_string();
    if base.is_empty() {
        return Err(Error::InvalidInput("API base URL must not be empty".to_string()));
    }
    if !is_http_url(&base) {
        return Err(Error::InvalidInput(
            "API base URL must include http:// or https://".to_string(),
        ));
    }
    Ok(base)
}
