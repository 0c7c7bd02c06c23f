//! Read accessors used by the web layer.

use std::sync::Arc;

use tracing::{info, warn};

use super::pipeline::IngestionPipeline;
use super::repository::{ArticleRepository, DayRepository};
use super::types::{Article, Day};
use crate::datetime::{format_ymd, next_day_ymd, parse_ymd};
use crate::{MirrorError, Result};

/// Read access to mirrored days and articles.
#[derive(Clone)]
pub struct DailyService {
    pipeline: Arc<IngestionPipeline>,
}

impl DailyService {
    /// Create a service reading from the pipeline's database.
    pub fn new(pipeline: Arc<IngestionPipeline>) -> Self {
        Self { pipeline }
    }

    /// The pipeline used for lazy fills.
    pub fn pipeline(&self) -> &Arc<IngestionPipeline> {
        &self.pipeline
    }

    /// Get a day, ingesting it first when it is not stored.
    ///
    /// The upstream listing for a date is requested with the following
    /// day as `date_before`. A failed fill is reported as not found.
    pub async fn get_day(&self, date: &str) -> Result<Day> {
        let date = format_ymd(parse_ymd(date)?);
        let days = DayRepository::new(self.pipeline.database().pool());

        if let Some(day) = days.get(&date).await? {
            return Ok(day);
        }

        let date_before = next_day_ymd(&date)?;
        info!(%date, %date_before, "Day not stored, filling from upstream");
        if let Err(e) = self.pipeline.ingest(&date_before).await {
            warn!(%date, error = %e, "Lazy fill failed");
            return Err(MirrorError::NotFound(format!("day {date}")));
        }

        days.get(&date)
            .await?
            .ok_or_else(|| MirrorError::NotFound(format!("day {date}")))
    }

    /// Get a stored article. Articles are never filled on demand.
    pub async fn get_article(&self, id: i64) -> Result<Article> {
        ArticleRepository::new(self.pipeline.database().pool())
            .get_by_id(id)
            .await?
            .ok_or_else(|| MirrorError::NotFound(format!("article {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daily::fetcher::{JsonFetcher, UpstreamApi};
    use crate::db::Database;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;

    const BASE: &str = "http://upstream.test/api/4";

    struct RouteFetcher {
        routes: HashMap<String, Value>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl JsonFetcher for RouteFetcher {
        async fn fetch_json(&self, url: &str) -> Result<Value> {
            self.calls.lock().unwrap().push(url.to_string());
            self.routes
                .get(url)
                .cloned()
                .ok_or_else(|| MirrorError::Fetch(format!("no route for {url}")))
        }
    }

    async fn service_with(routes: Vec<(&str, Value)>) -> (Arc<RouteFetcher>, DailyService) {
        let fetcher = Arc::new(RouteFetcher {
            routes: routes
                .into_iter()
                .map(|(path, value)| (format!("{BASE}{path}"), value))
                .collect(),
            calls: Mutex::new(Vec::new()),
        });
        let db = Database::open_in_memory().await.unwrap();
        let pipeline = IngestionPipeline::new(db, fetcher.clone(), UpstreamApi::new(BASE, "http://c.test"));
        (fetcher, DailyService::new(Arc::new(pipeline)))
    }

    #[tokio::test]
    async fn test_get_day_lazy_fill_uses_next_day() {
        let (fetcher, service) = service_with(vec![(
            "/news/before/20240301",
            json!({"date": "20240229", "stories": []}),
        )])
        .await;

        let day = service.get_day("20240229").await.unwrap();
        assert_eq!(day.date, "20240229");
        assert_eq!(
            fetcher.calls.lock().unwrap().as_slice(),
            [format!("{BASE}/news/before/20240301")]
        );

        // Second read is served from the store.
        service.get_day("20240229").await.unwrap();
        assert_eq!(fetcher.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_day_failed_fill_is_not_found() {
        let (_, service) = service_with(vec![]).await;
        let result = service.get_day("20240101").await;
        assert!(matches!(result, Err(MirrorError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_day_fill_with_other_date_is_not_found() {
        let (_, service) = service_with(vec![(
            "/news/before/20240102",
            json!({"date": "20231231", "stories": []}),
        )])
        .await;
        let result = service.get_day("20240101").await;
        assert!(matches!(result, Err(MirrorError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_day_invalid_date() {
        let (_, service) = service_with(vec![]).await;
        assert!(matches!(
            service.get_day("not-a-date").await,
            Err(MirrorError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_get_article_has_no_lazy_fill() {
        let (fetcher, service) = service_with(vec![]).await;
        let result = service.get_article(42).await;
        assert!(matches!(result, Err(MirrorError::NotFound(_))));
        assert!(fetcher.calls.lock().unwrap().is_empty());
    }
}
