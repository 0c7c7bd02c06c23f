//! Ingestion pipeline.
//!
//! One run fetches a day listing, fetches every story that is not stored
//! yet together with its comments, and writes the whole result in a single
//! transaction. Nothing is written when any fetch fails.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::authors::extract_authors;
use super::classify::{ArticleClassifier, KeywordClassifier};
use super::fetcher::{fetch_as, JsonFetcher, UpstreamApi};
use super::repository::{
    ArticleAuthorRepository, ArticleRepository, AuthorRepository, CommentRepository,
    DayRepository,
};
use super::types::{ArticleDetail, CommentList, DayListing, NewArticle, NewAuthor, NewComment};
use crate::datetime::parse_ymd;
use crate::db::Database;
use crate::Result;

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Authoritative content date reported by upstream.
    pub date: String,
    /// Whether the day row was created rather than refreshed.
    pub day_created: bool,
    /// Stories in the listing.
    pub stories_seen: usize,
    /// Stories skipped because their article was already stored.
    pub stories_skipped: usize,
    pub new_articles: usize,
    pub new_authors: usize,
    pub new_comments: usize,
    pub new_links: usize,
}

/// An article staged together with the names of its authors.
#[derive(Debug, Clone)]
struct StagedArticle {
    article: NewArticle,
    author_names: Vec<String>,
}

/// All rows derived from one run, applied together on commit.
#[derive(Debug)]
struct StagedBatch {
    date: String,
    day_data: String,
    updated_at: DateTime<Utc>,
    articles: Vec<StagedArticle>,
    authors: Vec<NewAuthor>,
    author_names: HashSet<String>,
    comments: Vec<NewComment>,
}

impl StagedBatch {
    fn new(date: String, day_data: String, updated_at: DateTime<Utc>) -> Self {
        Self {
            date,
            day_data,
            updated_at,
            articles: Vec::new(),
            authors: Vec::new(),
            author_names: HashSet::new(),
            comments: Vec::new(),
        }
    }

    fn contains_article(&self, id: i64) -> bool {
        self.articles.iter().any(|a| a.article.id == id)
    }

    /// Add an author unless a sighting with the same name is already staged.
    fn add_author(&mut self, author: NewAuthor) {
        if self.author_names.insert(author.name.clone()) {
            self.authors.push(author);
        }
    }
}

/// Fetches upstream content and stores it idempotently.
pub struct IngestionPipeline {
    db: Database,
    fetcher: Arc<dyn JsonFetcher>,
    classifier: Arc<dyn ArticleClassifier>,
    api: UpstreamApi,
    run_lock: Mutex<()>,
}

impl IngestionPipeline {
    /// Create a pipeline using the default keyword classifier.
    pub fn new(db: Database, fetcher: Arc<dyn JsonFetcher>, api: UpstreamApi) -> Self {
        Self {
            db,
            fetcher,
            classifier: Arc::new(KeywordClassifier::default()),
            api,
            run_lock: Mutex::new(()),
        }
    }

    /// Replace the article classifier.
    pub fn with_classifier(mut self, classifier: Arc<dyn ArticleClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Database the pipeline writes to.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Ingest the listing that upstream returns for `date_before`.
    ///
    /// Runs on one pipeline are serialized. Re-running for the same date
    /// refreshes the day payload and fetches only stories not yet stored.
    pub async fn ingest(&self, date_before: &str) -> Result<IngestReport> {
        parse_ymd(date_before)?;
        let _guard = self.run_lock.lock().await;

        let url = self.api.day_before_url(date_before);
        let (listing, raw): (DayListing, Value) = fetch_as(self.fetcher.as_ref(), &url).await?;
        debug!(
            date_before,
            date = %listing.date,
            stories = listing.stories.len(),
            "Fetched day listing"
        );

        let mut batch = StagedBatch::new(listing.date.clone(), raw.to_string(), Utc::now());
        let mut report = IngestReport {
            date: listing.date.clone(),
            stories_seen: listing.stories.len(),
            ..Default::default()
        };

        let articles = ArticleRepository::new(self.db.pool());
        for story in &listing.stories {
            if batch.contains_article(story.id) || articles.exists(story.id).await? {
                report.stories_skipped += 1;
                continue;
            }
            self.stage_story(&mut batch, story.id).await?;
        }

        self.commit(batch, &mut report).await?;

        info!(
            date = %report.date,
            day_created = report.day_created,
            stories = report.stories_seen,
            skipped = report.stories_skipped,
            articles = report.new_articles,
            authors = report.new_authors,
            comments = report.new_comments,
            "Ingestion run committed"
        );

        Ok(report)
    }

    async fn stage_story(&self, batch: &mut StagedBatch, id: i64) -> Result<()> {
        let url = self.api.article_url(id);
        let (detail, raw): (ArticleDetail, Value) = fetch_as(self.fetcher.as_ref(), &url).await?;

        let article_authors = extract_authors(&detail.body);

        let (short, _): (CommentList, Value) =
            fetch_as(self.fetcher.as_ref(), &self.api.short_comments_url(id)).await?;
        let (long, _): (CommentList, Value) =
            fetch_as(self.fetcher.as_ref(), &self.api.long_comments_url(id)).await?;
        let comments: Vec<_> = short.comments.into_iter().chain(long.comments).collect();

        let article_type = self.classifier.classify(&detail.title);
        debug!(
            id,
            title = %detail.title,
            %article_type,
            authors = article_authors.len(),
            comments = comments.len(),
            "Staged story"
        );

        batch.articles.push(StagedArticle {
            article: NewArticle {
                id,
                title: detail.title,
                date: batch.date.clone(),
                url: detail.share_url,
                image: detail.image,
                article_type,
                data: raw.to_string(),
            },
            author_names: article_authors.iter().map(|a| a.name.clone()).collect(),
        });

        for author in article_authors {
            batch.add_author(author);
        }
        for comment in &comments {
            batch.add_author(comment.to_author());
            batch.comments.push(NewComment::from(comment));
        }

        Ok(())
    }

    async fn commit(&self, batch: StagedBatch, report: &mut IngestReport) -> Result<()> {
        let mut tx = self.db.begin().await?;

        report.day_created =
            DayRepository::upsert(&mut tx, &batch.date, &batch.day_data, batch.updated_at).await?;

        for staged in &batch.articles {
            if !ArticleRepository::insert_if_absent(&mut tx, &staged.article).await? {
                warn!(id = staged.article.id, "Article stored by a concurrent run, skipping");
                continue;
            }
            report.new_articles += 1;
            for name in &staged.author_names {
                ArticleAuthorRepository::insert(&mut tx, staged.article.id, name).await?;
                report.new_links += 1;
            }
        }

        for author in &batch.authors {
            if AuthorRepository::insert_if_absent(&mut tx, author).await? {
                report.new_authors += 1;
            }
        }

        for comment in &batch.comments {
            if CommentRepository::insert_if_absent(&mut tx, comment).await? {
                report.new_comments += 1;
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
