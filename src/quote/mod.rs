pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Quotes at or above this many characters are drawn highlighted
pub const LONG_QUOTE_THRESHOLD: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub content: String,
    pub author: String,
}

impl Quote {
    #[cfg(test)]
    pub fn new(content: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            author: author.into(),
        }
    }

    /// Length in UTF-16 code units, so an emoji counts as two
    pub fn char_count(&self) -> usize {
        self.content.encode_utf16().count()
    }

    pub fn is_long(&self) -> bool {
        self.char_count() >= LONG_QUOTE_THRESHOLD
    }
}

/// Body of `GET /search/quotes`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub results: Vec<Quote>,
}

impl SearchResults {
    /// First match, only when the provider reported any. A body claiming
    /// matches but carrying none is malformed.
    pub fn first(&self) -> Result<Option<&Quote>, QuoteError> {
        if self.count == 0 {
            return Ok(None);
        }
        self.results.first().map(Some).ok_or_else(|| {
            QuoteError::Decode(format!("count is {} but results are empty", self.count))
        })
    }
}

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("quote provider returned HTTP {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Decode(String),
}

/// The remote quote provider
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Random quote filtered to `tags`
    async fn random(&self, tags: &[String]) -> Result<Quote, QuoteError>;

    /// Search quotes; `term` is already trimmed and non-empty
    async fn search(&self, term: &str) -> Result<SearchResults, QuoteError>;
}

/// Result of one fetch, delivered back to the app
#[derive(Debug)]
pub enum FetchOutcome {
    Random(Result<Quote, QuoteError>),
    Search(Result<SearchResults, QuoteError>),
}

pub fn random_url(base_url: &str, tags: &[String]) -> String {
    let base = base_url.trim_end_matches('/');
    if tags.is_empty() {
        format!("{}/random", base)
    } else {
        format!("{}/random?tags={}", base, tags.join("|"))
    }
}

/// The term goes into the query verbatim, no percent-encoding
pub fn search_url(base_url: &str, term: &str) -> String {
    format!("{}/search/quotes?query={}", base_url.trim_end_matches('/'), term)
}
