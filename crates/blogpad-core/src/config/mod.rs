//! Client configuration resolved from the environment.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::media::DEFAULT_FALLBACK_IMAGE_URL;
use crate::util::{is_http_url, non_blank};

const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 4;
const DATA_DIR_NAME: &str = "blogpad";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the remote post store
    pub api_base_url: String,
    /// Directory holding the persisted slots
    pub data_dir: PathBuf,
    pub request_timeout: Duration,
    pub probe_timeout: Duration,
    /// Substitute for URL images that fail to load
    pub fallback_image_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            data_dir: default_data_dir(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            fallback_image_url: DEFAULT_FALLBACK_IMAGE_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Resolve from process environment, loading `.env` first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_base_url =
            optional_http_url(&lookup, "BLOGPAD_API_BASE_URL")?.unwrap_or(defaults.api_base_url);
        let data_dir = non_blank(lookup("BLOGPAD_DATA_DIR"))
            .map_or(defaults.data_dir, PathBuf::from);
        let request_timeout = optional_secs(&lookup, "BLOGPAD_REQUEST_TIMEOUT_SECS")?
            .unwrap_or(defaults.request_timeout);
        let probe_timeout = optional_secs(&lookup, "BLOGPAD_PROBE_TIMEOUT_SECS")?
            .unwrap_or(defaults.probe_timeout);
        let fallback_image_url = optional_http_url(&lookup, "BLOGPAD_FALLBACK_IMAGE_URL")?
            .unwrap_or(defaults.fallback_image_url);

        Ok(Self {
            api_base_url,
            data_dir,
            request_timeout,
            probe_timeout,
            fallback_image_url,
        })
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}

fn optional_http_url(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<String>, ConfigError> {
    let Some(value) = non_blank(lookup(name)) else {
        return Ok(None);
    };
    if !is_http_url(&value) {
        return Err(ConfigError::Invalid(format!(
            "{name} must be an absolute http:// or https:// URL"
        )));
    }
    Ok(Some(value.trim_end_matches('/').to_string()))
}

fn optional_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<Duration>, ConfigError> {
    let Some(value) = non_blank(lookup(name)) else {
        return Ok(None);
    };
    let secs = value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(format!("{name} must be a whole number of seconds")))?;
    if secs == 0 {
        return Err(ConfigError::Invalid(format!("{name} must be greater than zero")));
    }
    Ok(Some(Duration::from_secs(secs)))
}
