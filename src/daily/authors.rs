//! Author extraction from article body HTML.
//!
//! Author names come from `span.author` nodes and avatars from `img.avatar`
//! nodes, both in document order. The i-th name is paired with the i-th
//! avatar by position only. When the counts differ the trailing entries of
//! the longer list are dropped.

use scraper::{Html, Selector};
use tracing::{debug, warn};

use super::types::NewAuthor;
use crate::error::{MirrorError, Result};

/// Selector for author name markers.
const AUTHOR_SELECTOR: &str = "span.author";

/// Selector for avatar markers.
const AVATAR_SELECTOR: &str = "img.avatar";

/// Punctuation trimmed from author names.
const NAME_PUNCTUATION: [char; 2] = ['，', '。'];

/// Extract ordered `(name, avatar, "")` authors from a body fragment.
///
/// Never fails: a fragment that cannot be processed yields no authors.
pub fn extract_authors(html: &str) -> Vec<NewAuthor> {
    match try_extract_authors(html) {
        Ok(authors) => authors,
        Err(e) => {
            warn!(error = %e, "Author extraction failed, treating article as authorless");
            Vec::new()
        }
    }
}

/// Extract authors, reporting selector failures.
pub fn try_extract_authors(html: &str) -> Result<Vec<NewAuthor>> {
    let author_selector = parse_selector(AUTHOR_SELECTOR)?;
    let avatar_selector = parse_selector(AVATAR_SELECTOR)?;

    let fragment = Html::parse_fragment(html);

    let names: Vec<String> = fragment
        .select(&author_selector)
        .map(|node| clean_name(&node.text().collect::<String>()))
        .collect();

    let avatars: Vec<String> = fragment
        .select(&avatar_selector)
        .filter_map(|node| node.value().attr("src"))
        .map(str::to_string)
        .collect();

    if names.len() != avatars.len() {
        debug!(
            names = names.len(),
            avatars = avatars.len(),
            "Author and avatar counts differ, pairing up to the shorter list"
        );
    }

    Ok(names
        .into_iter()
        .zip(avatars)
        .map(|(name, avatar)| NewAuthor::new(name, avatar))
        .collect())
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| MirrorError::Parse(format!("invalid selector '{selector}': {e}")))
}

/// Strip surrounding whitespace and Chinese comma/period punctuation.
fn clean_name(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || NAME_PUNCTUATION.contains(&c))
        .to_string()
}
