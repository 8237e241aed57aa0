use serde::{Deserialize, Serialize};

/// One harvested article
///
/// `url` is unique within a run. A record is kept even when its page could
/// not be fetched or its selectors matched nothing; in that case `content`
/// and/or `date` are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub content: String,
    pub date: String,
    #[serde(rename = "article_url")]
    pub url: String,
    pub category: String,
}

impl ArticleRecord {
    /// Creates a record carrying only listing metadata
    ///
    /// This is what an article becomes when its page fetch fails.
    pub fn degraded(url: impl Into<String>, title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: String::new(),
            date: String::new(),
            url: url.into(),
            category: category.into(),
        }
    }

    /// Returns true if any extracted field is missing
    pub fn is_degraded(&self) -> bool {
        self.content.is_empty() || self.date.is_empty()
    }
}
