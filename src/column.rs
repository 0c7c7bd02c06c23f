//! Column RSS regeneration.
//!
//! Each configured column is fetched from upstream and written as an RSS 2.0
//! document named after the column inside the output directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rss::{Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::daily::fetcher::{fetch_as, JsonFetcher, UpstreamApi};
use crate::{MirrorError, Result};

/// Article list returned by the column endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnArticles {
    #[serde(default)]
    pub data: Vec<ColumnArticle>,
}

/// One column article.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnArticle {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub excerpt: String,
    /// Unix timestamp of publication.
    #[serde(default)]
    pub created: Option<i64>,
}

/// Reject names that could escape the output directory.
pub fn validate_column_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(MirrorError::Validation(format!(
            "invalid column name: {name:?}"
        )));
    }
    Ok(())
}

/// Build the feed channel for a column.
pub fn build_channel(name: &str, site_url: &str, articles: &[ColumnArticle]) -> Channel {
    let title = format!("知乎专栏-{name}");
    let items: Vec<Item> = articles.iter().map(build_item).collect();

    ChannelBuilder::default()
        .title(title.clone())
        .link(format!("{}/{}", site_url.trim_end_matches('/'), name))
        .description(title)
        .last_build_date(Some(Utc::now().to_rfc2822()))
        .items(items)
        .build()
}

fn build_item(article: &ColumnArticle) -> Item {
    let guid = GuidBuilder::default()
        .value(article.url.clone())
        .permalink(true)
        .build();
    let pub_date = article
        .created
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        .map(|dt| dt.to_rfc2822());

    ItemBuilder::default()
        .title(Some(article.title.clone()))
        .link(Some(article.url.clone()))
        .description(Some(article.excerpt.clone()))
        .guid(Some(guid))
        .pub_date(pub_date)
        .build()
}

/// Regenerates column feed files.
pub struct ColumnFeedGenerator {
    fetcher: Arc<dyn JsonFetcher>,
    api: UpstreamApi,
    site_url: String,
    output_dir: PathBuf,
}

impl ColumnFeedGenerator {
    pub fn new(
        fetcher: Arc<dyn JsonFetcher>,
        api: UpstreamApi,
        site_url: impl Into<String>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            api,
            site_url: site_url.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn from_config(fetcher: Arc<dyn JsonFetcher>, config: &Config) -> Self {
        Self::new(
            fetcher,
            UpstreamApi::from_config(&config.upstream),
            &config.upstream.column_site_url,
            &config.columns.output_dir,
        )
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of a column's feed file.
    pub fn feed_path(&self, name: &str) -> Result<PathBuf> {
        validate_column_name(name)?;
        Ok(self.output_dir.join(name))
    }

    /// Fetch a column and rewrite its feed file.
    pub async fn regenerate(&self, name: &str) -> Result<PathBuf> {
        let path = self.feed_path(name)?;
        let url = self.api.column_articles_url(name);
        let (articles, _): (ColumnArticles, Value) = fetch_as(self.fetcher.as_ref(), &url).await?;

        let channel = build_channel(name, &self.site_url, &articles.data);
        let mut buf = Vec::new();
        channel
            .write_to(&mut buf)
            .map_err(|e| MirrorError::Rss(format!("failed to serialize feed {name}: {e}")))?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        tokio::fs::write(&path, buf).await?;

        debug!(column = name, items = articles.data.len(), path = %path.display(), "Column feed written");
        Ok(path)
    }

    /// Regenerate every column, skipping the ones that fail.
    ///
    /// Returns the number of feeds written.
    pub async fn regenerate_all(&self, names: &[String]) -> usize {
        let mut written = 0;
        for name in names {
            match self.regenerate(name).await {
                Ok(_) => written += 1,
                Err(e) => warn!(column = %name, error = %e, "Failed to regenerate column feed"),
            }
        }
        if !names.is_empty() {
            info!(written, total = names.len(), "Column feeds regenerated");
        }
        written
    }

    /// Read a previously generated feed.
    pub async fn read_feed(&self, name: &str) -> Result<String> {
        let path = self.feed_path(name)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(MirrorError::NotFound(format!("column feed {name}")))
            }
            Err(e) => Err(e.into()),
        }
    }
}
