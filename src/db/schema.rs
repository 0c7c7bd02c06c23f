//! Database schema and migrations.
//!
//! Migrations are applied sequentially when the database is first opened
//! or upgraded. The schema_version table tracks which have been applied.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: Mirrored entities
    r#"
-- One row per upstream day listing, refreshed in place on re-ingestion
CREATE TABLE days (
    date        TEXT PRIMARY KEY,        -- YYYYMMDD
    data        TEXT NOT NULL,           -- raw listing payload
    updated_at  TEXT NOT NULL
);

-- Articles are immutable once stored
CREATE TABLE articles (
    id            INTEGER PRIMARY KEY,   -- upstream story id
    title         TEXT NOT NULL,
    date          TEXT NOT NULL,
    url           TEXT NOT NULL,
    image         TEXT,
    article_type  TEXT NOT NULL DEFAULT 'general',
    data          TEXT NOT NULL          -- raw article payload
);

CREATE INDEX idx_articles_date ON articles(date);

-- First sighting of a name wins
CREATE TABLE authors (
    name    TEXT PRIMARY KEY,
    avatar  TEXT NOT NULL,
    bio     TEXT NOT NULL DEFAULT ''
);

CREATE TABLE comments (
    id        INTEGER PRIMARY KEY,       -- upstream comment id
    author    TEXT NOT NULL,
    content   TEXT NOT NULL,
    likes     INTEGER NOT NULL DEFAULT 0,
    time      INTEGER NOT NULL,
    reply_to  INTEGER NOT NULL DEFAULT 0 -- 0 when not a reply
);

CREATE TABLE article_authors (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    article_id  INTEGER NOT NULL,
    author      TEXT NOT NULL
);

CREATE INDEX idx_article_authors_article_id ON article_authors(article_id);
"#,
];
