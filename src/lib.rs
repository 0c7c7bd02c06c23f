//! Daily Mirror
//!
//! Mirrors a daily news feed: day listings, articles and comments are
//! ingested from an upstream JSON API into SQLite and served back through a
//! small read API, together with RSS feeds for selected columns.

pub mod column;
pub mod config;
pub mod daily;
pub mod datetime;
pub mod db;
pub mod error;
pub mod logging;
pub mod web;

pub use column::ColumnFeedGenerator;
pub use config::Config;
pub use daily::{DailyService, IngestReport, IngestionPipeline};
pub use db::Database;
pub use error::{MirrorError, Result};
