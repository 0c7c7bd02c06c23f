//! Types for mirrored daily content.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::MirrorError;

/// Classification of an article derived from its title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArticleType {
    /// Regular story.
    #[default]
    General,
    /// The daily roast/banter column.
    Roast,
    /// Late-night pieces.
    LateNight,
    /// Reading digest.
    Digest,
    /// Humorous "big misconception" stories.
    Misconception,
}

impl ArticleType {
    /// Stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleType::General => "general",
            ArticleType::Roast => "roast",
            ArticleType::LateNight => "late_night",
            ArticleType::Digest => "digest",
            ArticleType::Misconception => "misconception",
        }
    }
}

impl fmt::Display for ArticleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArticleType {
    type Err = MirrorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(ArticleType::General),
            "roast" => Ok(ArticleType::Roast),
            "late_night" => Ok(ArticleType::LateNight),
            "digest" => Ok(ArticleType::Digest),
            "misconception" => Ok(ArticleType::Misconception),
            other => Err(MirrorError::Validation(format!(
                "unknown article type: {other}"
            ))),
        }
    }
}

/// A stored day listing.
#[derive(Debug, Clone)]
pub struct Day {
    /// Day key (YYYYMMDD).
    pub date: String,
    /// Raw listing payload as JSON text.
    pub data: String,
    /// When the payload was last refreshed.
    pub updated_at: DateTime<Utc>,
}

/// A stored article.
#[derive(Debug, Clone)]
pub struct Article {
    /// Upstream story id.
    pub id: i64,
    pub title: String,
    /// Authoritative date of the listing that introduced the article.
    pub date: String,
    /// Canonical share URL.
    pub url: String,
    pub image: Option<String>,
    pub article_type: ArticleType,
    /// Raw article payload as JSON text.
    pub data: String,
}

/// A stored author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub avatar: String,
    pub bio: String,
}

/// A stored comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Upstream comment id.
    pub id: i64,
    pub author: String,
    pub content: String,
    pub likes: i64,
    /// Unix timestamp of the comment.
    pub time: i64,
    /// Id of the comment this one replies to, 0 when not a reply.
    pub reply_to: i64,
}

/// Link between an article and one of its authors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleAuthor {
    pub id: i64,
    pub article_id: i64,
    pub author: String,
}

/// Article staged for insertion.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub id: i64,
    pub title: String,
    pub date: String,
    pub url: String,
    pub image: Option<String>,
    pub article_type: ArticleType,
    pub data: String,
}

/// Author staged for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub name: String,
    pub avatar: String,
    pub bio: String,
}

impl NewAuthor {
    /// Create an author with an empty biography.
    pub fn new(name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avatar: avatar.into(),
            bio: String::new(),
        }
    }

    /// Set the biography.
    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = bio.into();
        self
    }
}

/// Comment staged for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub id: i64,
    pub author: String,
    pub content: String,
    pub likes: i64,
    pub time: i64,
    pub reply_to: i64,
}

/// Day listing returned by the upstream `news/before/{date}` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DayListing {
    /// Actual content date, which may differ from the query parameter.
    pub date: String,
    #[serde(default)]
    pub stories: Vec<StorySummary>,
}

/// Story entry of a day listing.
#[derive(Debug, Clone, Deserialize)]
pub struct StorySummary {
    pub id: i64,
}

/// Article detail returned by the upstream `news/{id}` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleDetail {
    pub title: String,
    /// Body HTML fragment.
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub image: Option<String>,
    pub share_url: String,
}

/// Comment list returned by the short/long comment endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentList {
    #[serde(default)]
    pub comments: Vec<UpstreamComment>,
}

/// A comment as delivered by upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamComment {
    pub id: i64,
    pub author: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub likes: i64,
    pub time: i64,
    #[serde(default)]
    pub reply_to: Option<ReplyTo>,
}

/// Reply target of an upstream comment.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyTo {
    #[serde(default)]
    pub id: Option<i64>,
}

impl UpstreamComment {
    /// Id of the replied-to comment, 0 when absent.
    pub fn reply_to_id(&self) -> i64 {
        self.reply_to.as_ref().and_then(|r| r.id).unwrap_or(0)
    }

    /// Author of the comment, with an empty biography.
    pub fn to_author(&self) -> NewAuthor {
        NewAuthor::new(&self.author, &self.avatar)
    }
}

impl From<&UpstreamComment> for NewComment {
    fn from(c: &UpstreamComment) -> Self {
        NewComment {
            id: c.id,
            author: c.author.clone(),
            content: c.content.clone(),
            likes: c.likes,
            time: c.time,
            reply_to: c.reply_to_id(),
        }
    }
}
