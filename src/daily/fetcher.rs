//! Upstream JSON fetcher.
//!
//! Performs a GET against an upstream URL and decodes the body as JSON.
//! There are no retries; callers treat any failure as fatal for the step.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::UpstreamConfig;
use crate::error::{MirrorError, Result};

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// Source of decoded JSON documents.
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    /// Fetch `url` and decode the body as JSON.
    async fn fetch_json(&self, url: &str) -> Result<Value>;
}

/// Fetch `url` and deserialize the JSON body into `T`.
///
/// A body with an unexpected shape is reported as a fetch error.
pub async fn fetch_as<T: DeserializeOwned>(fetcher: &dyn JsonFetcher, url: &str) -> Result<(T, Value)> {
    let value = fetcher.fetch_json(url).await?;
    let decoded = serde_json::from_value(value.clone())
        .map_err(|e| MirrorError::Fetch(format!("unexpected payload from {url}: {e}")))?;
    Ok((decoded, value))
}

/// HTTP implementation of [`JsonFetcher`].
pub struct HttpFetcher {
    client: Client,
    max_body_bytes: u64,
}

impl HttpFetcher {
    /// Create a fetcher from the upstream configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.total_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| MirrorError::Fetch(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes,
        })
    }
}

#[async_trait]
impl JsonFetcher for HttpFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value> {
        debug!(%url, "Fetching upstream JSON");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MirrorError::Fetch(format!("request to {url} failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(MirrorError::Fetch(format!(
                "HTTP error from {url}: {}",
                response.status()
            )));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_body_bytes {
                return Err(MirrorError::Fetch(format!(
                    "response too large: {} bytes (max {} bytes)",
                    content_length, self.max_body_bytes
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| MirrorError::Fetch(format!("failed to read response: {}", e)))?;

        if bytes.len() as u64 > self.max_body_bytes {
            return Err(MirrorError::Fetch(format!(
                "response too large: {} bytes (max {} bytes)",
                bytes.len(),
                self.max_body_bytes
            )));
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| MirrorError::Fetch(format!("invalid JSON from {url}: {}", e)))
    }
}

/// Builder for upstream endpoint URLs.
#[derive(Debug, Clone)]
pub struct UpstreamApi {
    news_base_url: String,
    column_base_url: String,
}

impl UpstreamApi {
    /// Create from base URLs; trailing slashes are ignored.
    pub fn new(news_base_url: impl Into<String>, column_base_url: impl Into<String>) -> Self {
        Self {
            news_base_url: news_base_url.into().trim_end_matches('/').to_string(),
            column_base_url: column_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create from the upstream configuration.
    pub fn from_config(config: &UpstreamConfig) -> Self {
        Self::new(&config.news_base_url, &config.column_base_url)
    }

    /// Day listing for the day before `date_before`.
    pub fn day_before_url(&self, date_before: &str) -> String {
        format!("{}/news/before/{}", self.news_base_url, date_before)
    }

    /// Article detail.
    pub fn article_url(&self, id: i64) -> String {
        format!("{}/news/{}", self.news_base_url, id)
    }

    /// Short-form comments of a story.
    pub fn short_comments_url(&self, id: i64) -> String {
        format!("{}/story/{}/short-comments", self.news_base_url, id)
    }

    /// Long-form comments of a story.
    pub fn long_comments_url(&self, id: i64) -> String {
        format!("{}/story/{}/long-comments", self.news_base_url, id)
    }

    /// Article list of a column.
    pub fn column_articles_url(&self, name: &str) -> String {
        format!(
            "{}/{}/articles",
            self.column_base_url,
            urlencoding::encode(name)
        )
    }
}

impl Default for UpstreamApi {
    fn default() -> Self {
        Self::from_config(&UpstreamConfig::default())
    }
}
