//! Google web search, the secondary provider.
//!
//! Frequently blocked or served a consent page; the cascade only reaches it
//! when the primary provider produced nothing.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

use super::{SearchHit, SearchProvider, dedup_http};
use crate::errors::EnrichmentError;
use crate::http::HttpClient;

const ENDPOINT: &str = "https://www.google.com/search";

#[derive(Debug, Clone)]
pub struct GoogleProvider {
    client: Arc<dyn HttpClient>,
    language: String,
    timeout: Duration,
}

impl GoogleProvider {
    pub fn new(client: Arc<dyn HttpClient>, language: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            language: language.into(),
            timeout,
        }
    }

    fn search_url(&self, query: &str, max_results: usize) -> String {
        format!(
            "{ENDPOINT}?q={}&num={max_results}&hl={}",
            urlencoding::encode(query),
            urlencoding::encode(&self.language)
        )
    }

    /// Extracts organic result links from a results page.
    ///
    /// Handles both `/url?q=<target>` redirect anchors and plain absolute
    /// anchors; links back into Google itself are dropped.
    pub fn parse_results(html: &str, max_results: usize) -> Vec<SearchHit> {
        let document = Html::parse_document(html);
        let Ok(anchor_selector) = Selector::parse("a[href]") else {
            return Vec::new();
        };

        let hits = document
            .select(&anchor_selector)
            .filter_map(|anchor| {
                let href = anchor.value().attr("href")?;
                let target = resolve_target(href)?;
                if is_google_host(&target) {
                    return None;
                }
                let title = anchor.text().collect::<String>().trim().to_string();
                Some(SearchHit::new(target, title))
            })
            .collect();

        dedup_http(hits, max_results)
    }
}

fn resolve_target(href: &str) -> Option<String> {
    if href.starts_with("/url?") {
        let parsed = Url::parse(&format!("https://www.google.com{href}")).ok()?;
        return parsed
            .query_pairs()
            .find(|(key, _)| key == "q" || key == "url")
            .map(|(_, value)| value.into_owned());
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    None
}

fn is_google_host(target: &str) -> bool {
    let Ok(parsed) = Url::parse(target) else {
        return true;
    };
    let host = parsed.host_str().unwrap_or_default();
    host.contains("google.") || host.ends_with("gstatic.com")
}

#[async_trait]
impl SearchProvider for GoogleProvider {
    fn name(&self) -> &str {
        "google"
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, EnrichmentError> {
        let url = self.search_url(query, max_results);
        let response = self
            .client
            .get(&url, self.timeout)
            .await
            .map_err(|e| EnrichmentError::for_provider(self.name(), e))?;

        if !response.is_success() {
            return Err(EnrichmentError::ProviderError {
                provider: self.name().to_string(),
                reason: format!("HTTP {}", response.status),
            });
        }

        Ok(Self::parse_results(&response.body, max_results))
    }
}
