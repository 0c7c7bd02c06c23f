//! Daily news mirroring.
//!
//! This module fetches day listings, articles and comments from upstream,
//! stores them idempotently and serves them back to the web layer.

pub mod authors;
pub mod classify;
pub mod fetcher;
pub mod pipeline;
pub mod repository;
pub mod schedule;
pub mod service;
pub mod types;
pub mod updater;

pub use authors::{extract_authors, try_extract_authors};
pub use classify::{ArticleClassifier, FixedClassifier, KeywordClassifier};
pub use fetcher::{fetch_as, HttpFetcher, JsonFetcher, UpstreamApi};
pub use pipeline::{IngestReport, IngestionPipeline};
pub use repository::{
    ArticleAuthorRepository, ArticleRepository, AuthorRepository, CommentRepository,
    DayRepository,
};
pub use schedule::{local_now, next_target_date};
pub use service::DailyService;
pub use types::{
    Article, ArticleAuthor, ArticleDetail, ArticleType, Author, Comment, CommentList, Day,
    DayListing, NewArticle, NewAuthor, NewComment, StorySummary, UpstreamComment,
};
pub use updater::{run_update_once, start_daily_updater, DailyUpdater, UpdateOutcome};
