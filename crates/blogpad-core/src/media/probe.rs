//! Reachability probes for URL-mode images.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::error::{Error, Result};

/// Decides whether a remote image URL can be loaded.
#[allow(async_fn_in_trait)]
pub trait ImageProbe {
    async fn is_loadable(&self, url: &str) -> bool;
}

/// Probe that fetches the URL and expects an image response.
#[derive(Debug, Clone)]
pub struct HttpImageProbe {
    client: Client,
    timeout: Duration,
}

impl HttpImageProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|error| Error::Network(format!("Failed to construct HTTP client: {error}")))?;
        Ok(Self { client, timeout })
    }
}

impl ImageProbe for HttpImageProbe {
    async fn is_loadable(&self, url: &str) -> bool {
        let request = self.client.get(url).header("Accept", "image/*").send();
        let response = match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(error)) => {
                tracing::debug!("Image probe for {} failed: {}", url, error);
                return false;
            }
            Err(_) => {
                tracing::debug!("Image probe for {} timed out", url);
                return false;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Image probe for {} returned HTTP {}", url, response.status());
            return false;
        }

        response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_none_or(|content_type| {
                content_type
                    .trim()
                    .to_ascii_lowercase()
                    .starts_with("image/")
            })
    }
}

/// Probe with a fixed answer, for offline use and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticProbe(pub bool);

impl ImageProbe for StaticProbe {
    async fn is_loadable(&self, _url: &str) -> bool {
        self.0
    }
}
