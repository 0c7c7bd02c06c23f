//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use daily_mirror::column::ColumnFeedGenerator;
use daily_mirror::daily::{JsonFetcher, UpstreamApi};
use daily_mirror::{DailyService, Database, IngestionPipeline, MirrorError, Result};
use serde_json::{json, Value};

pub const NEWS_BASE: &str = "http://news.test/api/4";
pub const COLUMN_BASE: &str = "http://columns.test/api/v4/columns";
pub const COLUMN_SITE: &str = "https://zhuanlan.test";

/// In-memory upstream keyed by full URL.
#[derive(Default)]
pub struct MockUpstream {
    routes: Mutex<HashMap<String, Value>>,
    requests: Mutex<Vec<String>>,
}

impl MockUpstream {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Serve `value` for a path under the news base URL.
    pub fn news(&self, path: &str, value: Value) {
        self.routes
            .lock()
            .unwrap()
            .insert(format!("{NEWS_BASE}{path}"), value);
    }

    /// Serve `value` for a column's article list.
    pub fn column(&self, name: &str, value: Value) {
        self.routes
            .lock()
            .unwrap()
            .insert(format!("{COLUMN_BASE}/{name}/articles"), value);
    }

    /// Stop serving a path under the news base URL.
    pub fn remove_news(&self, path: &str) {
        self.routes
            .lock()
            .unwrap()
            .remove(&format!("{NEWS_BASE}{path}"));
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Register a story with the given body HTML and comment lists.
    pub fn story(&self, id: i64, title: &str, body: &str, short: Value, long: Value) {
        self.news(
            &format!("/news/{id}"),
            json!({
                "id": id,
                "title": title,
                "body": body,
                "image": format!("https://pic.test/{id}.jpg"),
                "share_url": format!("https://daily.test/story/{id}"),
            }),
        );
        self.news(&format!("/story/{id}/short-comments"), json!({ "comments": short }));
        self.news(&format!("/story/{id}/long-comments"), json!({ "comments": long }));
    }
}

#[async_trait]
impl JsonFetcher for MockUpstream {
    async fn fetch_json(&self, url: &str) -> Result<Value> {
        self.requests.lock().unwrap().push(url.to_string());
        self.routes
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| MirrorError::Fetch(format!("HTTP error from {url}: 404 Not Found")))
    }
}

/// Body HTML with one avatar/name pair per author.
pub fn authors_body(authors: &[(&str, &str)]) -> String {
    let mut body = String::from(r#"<div class="main-wrap content-wrap">"#);
    for (name, avatar) in authors {
        body.push_str(&format!(
            r#"<div class="meta"><img class="avatar" src="{avatar}"><span class="author">{name}，</span><span class="bio">bio</span></div>"#
        ));
    }
    body.push_str("</div>");
    body
}

pub fn api() -> UpstreamApi {
    UpstreamApi::new(NEWS_BASE, COLUMN_BASE)
}

pub async fn create_pipeline(upstream: Arc<MockUpstream>) -> Arc<IngestionPipeline> {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    Arc::new(IngestionPipeline::new(db, upstream, api()))
}

pub fn create_columns(upstream: Arc<MockUpstream>, output_dir: &Path) -> Arc<ColumnFeedGenerator> {
    Arc::new(ColumnFeedGenerator::new(upstream, api(), COLUMN_SITE, output_dir))
}

pub fn create_service(pipeline: Arc<IngestionPipeline>) -> DailyService {
    DailyService::new(pipeline)
}
