//! Keyword search providers consulted by the cascade.

use async_trait::async_trait;

use crate::errors::EnrichmentError;

pub mod duckduckgo;
pub mod google;
#[cfg(any(test, feature = "test-utils"))]
pub mod scripted;

pub use duckduckgo::DuckDuckGoProvider;
pub use google::GoogleProvider;
#[cfg(any(test, feature = "test-utils"))]
pub use scripted::ScriptedProvider;

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
}

impl SearchHit {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

/// Trait for keyword search backends.
///
/// Results come back in ranked order. An empty list is a valid answer.
#[async_trait]
pub trait SearchProvider: Send + Sync + std::fmt::Debug {
    /// Short identifier used in diagnostics.
    fn name(&self) -> &str;

    /// Searches for `query`, returning at most `max_results` hits.
    ///
    /// # Errors
    /// - `EnrichmentError::ProviderError` - Backend unreachable, blocked or timed out
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, EnrichmentError>;
}

/// Keeps only absolute http(s) URLs and drops duplicates, preserving order.
pub(crate) fn dedup_http(hits: Vec<SearchHit>, max_results: usize) -> Vec<SearchHit> {
    let mut seen = std::collections::HashSet::new();
    hits.into_iter()
        .filter(|hit| hit.url.starts_with("http://") || hit.url.starts_with("https://"))
        .filter(|hit| seen.insert(hit.url.clone()))
        .take(max_results)
        .collect()
}
