//! Repositories for mirrored entities.
//!
//! Reads go through the pool held by each repository. Writes are associated
//! functions taking a connection, so the ingestion pipeline can run them all
//! on one transaction. Every insert is a single `INSERT OR IGNORE` that
//! reports whether a row was created.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::warn;

use super::types::{
    Article, ArticleAuthor, ArticleType, Author, Comment, Day, NewArticle, NewAuthor, NewComment,
};
use crate::Result;

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_updated_at(date: &str, raw: &str) -> DateTime<Utc> {
    parse_datetime(raw).unwrap_or_else(|| {
        warn!(%date, updated_at = raw, "Corrupt day timestamp, using current time");
        Utc::now()
    })
}

fn parse_article_type(id: i64, raw: &str) -> ArticleType {
    raw.parse().unwrap_or_else(|e| {
        warn!(id, article_type = raw, error = %e, "Corrupt article type, using general");
        ArticleType::General
    })
}

/// Row type for a day from database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct DayRow {
    date: String,
    data: String,
    updated_at: String,
}

impl From<DayRow> for Day {
    fn from(row: DayRow) -> Self {
        let updated_at = parse_updated_at(&row.date, &row.updated_at);
        Day {
            date: row.date,
            data: row.data,
            updated_at,
        }
    }
}

/// Row type for an article from database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ArticleRow {
    id: i64,
    title: String,
    date: String,
    url: String,
    image: Option<String>,
    article_type: String,
    data: String,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Article {
            id: row.id,
            title: row.title,
            date: row.date,
            url: row.url,
            image: row.image,
            article_type: parse_article_type(row.id, &row.article_type),
            data: row.data,
        }
    }
}

/// Row type for an author from database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct AuthorRow {
    name: String,
    avatar: String,
    bio: String,
}

impl From<AuthorRow> for Author {
    fn from(row: AuthorRow) -> Self {
        Author {
            name: row.name,
            avatar: row.avatar,
            bio: row.bio,
        }
    }
}

/// Row type for a comment from database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct CommentRow {
    id: i64,
    author: String,
    content: String,
    likes: i64,
    time: i64,
    reply_to: i64,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            author: row.author,
            content: row.content,
            likes: row.likes,
            time: row.time,
            reply_to: row.reply_to,
        }
    }
}

/// Row type for an article/author link from database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ArticleAuthorRow {
    id: i64,
    article_id: i64,
    author: String,
}

impl From<ArticleAuthorRow> for ArticleAuthor {
    fn from(row: ArticleAuthorRow) -> Self {
        ArticleAuthor {
            id: row.id,
            article_id: row.article_id,
            author: row.author,
        }
    }
}

/// Repository for day listings.
pub struct DayRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> DayRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a day by its `YYYYMMDD` key.
    pub async fn get(&self, date: &str) -> Result<Option<Day>> {
        let row = sqlx::query_as::<_, DayRow>(
            "SELECT date, data, updated_at FROM days WHERE date = ?",
        )
        .bind(date)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Day::from))
    }

    /// Check whether a day is stored.
    pub async fn exists(&self, date: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM days WHERE date = ?")
            .bind(date)
            .fetch_one(self.pool)
            .await?;
        Ok(count > 0)
    }

    /// Count stored days.
    pub async fn count(&self) -> Result<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM days")
            .fetch_one(self.pool)
            .await?)
    }

    /// Insert a day or refresh its payload and timestamp in place.
    ///
    /// Returns `true` when the row was created. The first statement is a
    /// write, so a deferred transaction takes the write lock up front and
    /// waits on the busy timeout instead of failing a lock upgrade.
    pub async fn upsert(
        conn: &mut SqliteConnection,
        date: &str,
        data: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        let updated_at = updated_at.to_rfc3339();

        let inserted =
            sqlx::query("INSERT OR IGNORE INTO days (date, data, updated_at) VALUES (?, ?, ?)")
                .bind(date)
                .bind(data)
                .bind(&updated_at)
                .execute(&mut *conn)
                .await?;

        if inserted.rows_affected() > 0 {
            return Ok(true);
        }

        sqlx::query("UPDATE days SET data = ?, updated_at = ? WHERE date = ?")
            .bind(data)
            .bind(&updated_at)
            .bind(date)
            .execute(&mut *conn)
            .await?;

        Ok(false)
    }
}

/// Repository for articles.
pub struct ArticleRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ArticleRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get an article by upstream id.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Article>> {
        let row = sqlx::query_as::<_, ArticleRow>(
            r#"
            SELECT id, title, date, url, image, article_type, data
            FROM articles
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Article::from))
    }

    /// Check whether an article is stored.
    pub async fn exists(&self, id: i64) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles WHERE id = ?")
            .bind(id)
            .fetch_one(self.pool)
            .await?;
        Ok(count > 0)
    }

    /// List articles of a day, ordered by id.
    pub async fn list_by_date(&self, date: &str) -> Result<Vec<Article>> {
        let rows = sqlx::query_as::<_, ArticleRow>(
            r#"
            SELECT id, title, date, url, image, article_type, data
            FROM articles
            WHERE date = ?
            ORDER BY id ASC
            "#,
        )
        .bind(date)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Article::from).collect())
    }

    /// Count stored articles.
    pub async fn count(&self) -> Result<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(self.pool)
            .await?)
    }

    /// Insert an article unless its id is already stored.
    ///
    /// Returns `true` when the row was created.
    pub async fn insert_if_absent(conn: &mut SqliteConnection, article: &NewArticle) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO articles (id, title, date, url, image, article_type, data)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(article.id)
        .bind(&article.title)
        .bind(&article.date)
        .bind(&article.url)
        .bind(&article.image)
        .bind(article.article_type.as_str())
        .bind(&article.data)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Repository for authors.
pub struct AuthorRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AuthorRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get an author by name.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Author>> {
        let row = sqlx::query_as::<_, AuthorRow>(
            "SELECT name, avatar, bio FROM authors WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Author::from))
    }

    /// Count stored authors.
    pub async fn count(&self) -> Result<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(self.pool)
            .await?)
    }

    /// Insert an author unless the name is already stored.
    ///
    /// An existing row is never updated, even when avatar or bio differ.
    pub async fn insert_if_absent(conn: &mut SqliteConnection, author: &NewAuthor) -> Result<bool> {
        let result = sqlx::query("INSERT OR IGNORE INTO authors (name, avatar, bio) VALUES (?, ?, ?)")
            .bind(&author.name)
            .bind(&author.avatar)
            .bind(&author.bio)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Repository for comments.
pub struct CommentRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CommentRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a comment by upstream id.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(
            "SELECT id, author, content, likes, time, reply_to FROM comments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Comment::from))
    }

    /// Count stored comments.
    pub async fn count(&self) -> Result<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(self.pool)
            .await?)
    }

    /// Insert a comment unless its id is already stored.
    pub async fn insert_if_absent(conn: &mut SqliteConnection, comment: &NewComment) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO comments (id, author, content, likes, time, reply_to)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(comment.id)
        .bind(&comment.author)
        .bind(&comment.content)
        .bind(comment.likes)
        .bind(comment.time)
        .bind(comment.reply_to)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Repository for article/author links.
pub struct ArticleAuthorRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ArticleAuthorRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List the authors linked to an article, in insertion order.
    pub async fn list_for_article(&self, article_id: i64) -> Result<Vec<ArticleAuthor>> {
        let rows = sqlx::query_as::<_, ArticleAuthorRow>(
            "SELECT id, article_id, author FROM article_authors WHERE article_id = ? ORDER BY id ASC",
        )
        .bind(article_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ArticleAuthor::from).collect())
    }

    /// Count stored links.
    pub async fn count(&self) -> Result<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM article_authors")
            .fetch_one(self.pool)
            .await?)
    }

    /// Link an author to an article.
    pub async fn insert(conn: &mut SqliteConnection, article_id: i64, author: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO article_authors (article_id, author) VALUES (?, ?)")
            .bind(article_id)
            .bind(author)
            .execute(&mut *conn)
            .await?;

        Ok(result.last_insert_rowid())
    }
}
