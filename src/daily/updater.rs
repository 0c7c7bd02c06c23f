//! Periodic background updater.
//!
//! Ingests the current target date and then regenerates column feeds on a
//! fixed interval.

use std::sync::Arc;

use chrono_tz::Tz;
use tokio::time::{interval, Duration};
use tracing::{error, info};

use super::pipeline::{IngestReport, IngestionPipeline};
use super::schedule::{local_now, next_target_date};
use crate::column::ColumnFeedGenerator;
use crate::config::ScheduleConfig;
use crate::{MirrorError, Result};

/// Result of one update pass.
#[derive(Debug, Clone, Default)]
pub struct UpdateOutcome {
    /// Target `date_before` that was ingested.
    pub target: String,
    /// Ingestion report, absent when ingestion failed.
    pub report: Option<IngestReport>,
    /// Column feeds written.
    pub columns_written: usize,
}

/// Run one update pass: ingest the target date, then regenerate columns.
///
/// An ingestion failure is logged and does not prevent column regeneration.
pub async fn run_update_once(
    pipeline: &IngestionPipeline,
    columns: &ColumnFeedGenerator,
    column_names: &[String],
    tz: &Tz,
) -> UpdateOutcome {
    let target = next_target_date(local_now(tz));
    info!(%target, "Running daily update");

    let report = match pipeline.ingest(&target).await {
        Ok(report) => Some(report),
        Err(e) => {
            error!(%target, error = %e, "Daily ingestion failed");
            None
        }
    };

    let columns_written = columns.regenerate_all(column_names).await;

    UpdateOutcome {
        target,
        report,
        columns_written,
    }
}

/// Background task driving [`run_update_once`] on an interval.
pub struct DailyUpdater {
    pipeline: Arc<IngestionPipeline>,
    columns: Arc<ColumnFeedGenerator>,
    column_names: Vec<String>,
    timezone: Tz,
    update_interval: Duration,
}

impl DailyUpdater {
    /// Create an updater from the schedule configuration.
    pub fn new(
        pipeline: Arc<IngestionPipeline>,
        columns: Arc<ColumnFeedGenerator>,
        column_names: Vec<String>,
        schedule: &ScheduleConfig,
    ) -> Result<Self> {
        let timezone: Tz = schedule
            .timezone
            .parse()
            .map_err(|_| MirrorError::Config(format!("unknown timezone: {}", schedule.timezone)))?;

        Ok(Self {
            pipeline,
            columns,
            column_names,
            timezone,
            update_interval: Duration::from_secs(schedule.update_interval_secs.max(1)),
        })
    }

    pub fn interval(&self) -> Duration {
        self.update_interval
    }

    /// Run one pass immediately.
    pub async fn run_once(&self) -> UpdateOutcome {
        run_update_once(&self.pipeline, &self.columns, &self.column_names, &self.timezone).await
    }

    /// Run the updater loop. The first pass starts immediately.
    pub async fn run(&self) {
        info!(
            interval_secs = self.update_interval.as_secs(),
            timezone = %self.timezone,
            "Daily updater started"
        );

        let mut timer = interval(self.update_interval);
        loop {
            timer.tick().await;
            self.run_once().await;
        }
    }
}

/// Spawn the updater as a background task.
pub fn start_daily_updater(updater: DailyUpdater) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        updater.run().await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daily::fetcher::{JsonFetcher, UpstreamApi};
    use crate::daily::repository::DayRepository;
    use crate::db::Database;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    /// Answers every listing request with an empty day and every column
    /// request with one article.
    struct AnyDayFetcher;

    #[async_trait]
    impl JsonFetcher for AnyDayFetcher {
        async fn fetch_json(&self, url: &str) -> Result<Value> {
            if url.contains("/news/before/") {
                Ok(json!({"date": "20240101", "stories": []}))
            } else if url.ends_with("/articles") {
                Ok(json!({"data": [{"title": "t", "url": "https://z.test/p/1", "excerpt": "e"}]}))
            } else {
                Err(MirrorError::Fetch(format!("no route for {url}")))
            }
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl JsonFetcher for FailingFetcher {
        async fn fetch_json(&self, url: &str) -> Result<Value> {
            Err(MirrorError::Fetch(format!("offline: {url}")))
        }
    }

    async fn parts(fetcher: Arc<dyn JsonFetcher>, dir: &TempDir) -> (Arc<IngestionPipeline>, Arc<ColumnFeedGenerator>) {
        let api = UpstreamApi::new("http://news.test", "http://columns.test");
        let db = Database::open_in_memory().await.unwrap();
        let pipeline = Arc::new(IngestionPipeline::new(db, fetcher.clone(), api.clone()));
        let columns = Arc::new(ColumnFeedGenerator::new(
            fetcher,
            api,
            "https://z.test",
            dir.path(),
        ));
        (pipeline, columns)
    }

    #[tokio::test]
    async fn test_run_once_ingests_and_regenerates() {
        let dir = TempDir::new().unwrap();
        let (pipeline, columns) = parts(Arc::new(AnyDayFetcher), &dir).await;
        let updater = DailyUpdater::new(
            pipeline.clone(),
            columns,
            vec!["col".to_string()],
            &ScheduleConfig::default(),
        )
        .unwrap();

        let outcome = updater.run_once().await;
        assert_eq!(outcome.target.len(), 8);
        assert_eq!(outcome.report.unwrap().date, "20240101");
        assert_eq!(outcome.columns_written, 1);
        assert!(dir.path().join("col").exists());
        assert!(DayRepository::new(pipeline.database().pool())
            .exists("20240101")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_ingest_failure_is_contained() {
        let dir = TempDir::new().unwrap();
        let (pipeline, columns) = parts(Arc::new(FailingFetcher), &dir).await;
        let tz: Tz = "Asia/Shanghai".parse().unwrap();

        let outcome = run_update_once(&pipeline, &columns, &["col".to_string()], &tz).await;
        assert!(outcome.report.is_none());
        assert_eq!(outcome.columns_written, 0);
    }

    #[tokio::test]
    async fn test_unknown_timezone_rejected() {
        let dir = TempDir::new().unwrap();
        let (pipeline, columns) = parts(Arc::new(FailingFetcher), &dir).await;
        let schedule = ScheduleConfig {
            timezone: "Mars/Olympus".to_string(),
            ..Default::default()
        };
        assert!(DailyUpdater::new(pipeline, columns, vec![], &schedule).is_err());
    }

    #[tokio::test]
    async fn test_interval_from_config() {
        let dir = TempDir::new().unwrap();
        let (pipeline, columns) = parts(Arc::new(FailingFetcher), &dir).await;
        let schedule = ScheduleConfig {
            update_interval_secs: 120,
            ..Default::default()
        };
        let updater = DailyUpdater::new(pipeline, columns, vec![], &schedule).unwrap();
        assert_eq!(updater.interval(), Duration::from_secs(120));
    }
}
