//! Article type classification from titles.

use super::types::ArticleType;

/// Classifies articles by title.
///
/// Implementations must be deterministic and accept any string.
pub trait ArticleClassifier: Send + Sync {
    /// Classify an article title.
    fn classify(&self, title: &str) -> ArticleType;
}

/// Keyword rule table used by default.
///
/// Rules are checked in order; the first keyword found in the title wins.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    rules: Vec<(String, ArticleType)>,
}

impl KeywordClassifier {
    /// Create a classifier with an explicit rule table.
    pub fn new(rules: Vec<(String, ArticleType)>) -> Self {
        Self { rules }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(vec![
            ("瞎扯".to_string(), ArticleType::Roast),
            ("深夜".to_string(), ArticleType::LateNight),
            ("读读日报".to_string(), ArticleType::Digest),
            ("大误".to_string(), ArticleType::Misconception),
        ])
    }
}

impl ArticleClassifier for KeywordClassifier {
    fn classify(&self, title: &str) -> ArticleType {
        self.rules
            .iter()
            .find(|(keyword, _)| title.contains(keyword.as_str()))
            .map(|(_, article_type)| *article_type)
            .unwrap_or_default()
    }
}

/// Classifier that assigns the same type to every title.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedClassifier(pub ArticleType);

impl ArticleClassifier for FixedClassifier {
    fn classify(&self, _title: &str) -> ArticleType {
        self.0
    }
}
