//! DuckDuckGo HTML endpoint, the primary search provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};

use super::{SearchHit, SearchProvider, dedup_http};
use crate::errors::EnrichmentError;
use crate::http::HttpClient;

const ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// Scrapes the JavaScript-free DuckDuckGo results page.
#[derive(Debug, Clone)]
pub struct DuckDuckGoProvider {
    client: Arc<dyn HttpClient>,
    region: String,
    timeout: Duration,
}

impl DuckDuckGoProvider {
    pub fn new(client: Arc<dyn HttpClient>, region: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            region: region.into(),
            timeout,
        }
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{ENDPOINT}?q={}&kl={}",
            urlencoding::encode(query),
            urlencoding::encode(&self.region)
        )
    }

    /// Extracts ranked result links from a results page.
    pub fn parse_results(html: &str, max_results: usize) -> Vec<SearchHit> {
        let document = Html::parse_document(html);
        let Ok(link_selector) = Selector::parse("a.result__a") else {
            return Vec::new();
        };

        let hits = document
            .select(&link_selector)
            .filter_map(|link| {
                let href = link.value().attr("href")?;
                if is_ad_link(href) {
                    return None;
                }
                let title = link.text().collect::<String>().trim().to_string();
                Some(SearchHit::new(unwrap_redirect(href), title))
            })
            .collect();

        dedup_http(hits, max_results)
    }
}

/// Result links are wrapped as `//duckduckgo.com/l/?uddg=<encoded>&rut=...`.
fn unwrap_redirect(href: &str) -> String {
    if let Some(position) = href.find("uddg=") {
        let start = position + "uddg=".len();
        let end = href[start..]
            .find('&')
            .map(|offset| start + offset)
            .unwrap_or(href.len());
        if let Ok(decoded) = urlencoding::decode(&href[start..end]) {
            return decoded.into_owned();
        }
    }
    href.to_string()
}

fn is_ad_link(href: &str) -> bool {
    href.contains("duckduckgo.com/y.js")
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, EnrichmentError> {
        let url = self.search_url(query);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpResponse;
    use crate::providers::scripted::StaticHttpClient;

    const RESULTS_PAGE: &str = r#"
        <html><body>
          <div class="result result--ad">
            <a class="result__a" href="https://duckduckgo.com/y.js?ad_provider=x">Buy Dune</a>
          </div>
          <div class="result">
            <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.imdb.com%2Ftitle%2Ftt1160419%2F&amp;rut=abc">Dune (2021) - IMDb</a>
          </div>
          <div class="result">
            <a class="result__a" href="https://en.wikipedia.org/wiki/Dune_(2021_film)">Dune (2021 film) - Wikipedia</a>
          </div>
          <div class="result">
            <a class="result__a" href="https://www.rottentomatoes.com/m/dune_2021">Dune</a>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_results_unwraps_and_skips_ads() {
        let hits = DuckDuckGoProvider::parse_results(RESULTS_PAGE, 5);
        let urls: Vec<_> = hits.iter().map(|h| h.url.as_str()).collect();

        assert_eq!(
            urls,
            vec![
                "https://www.imdb.com/title/tt1160419/",
                "https://en.wikipedia.org/wiki/Dune_(2021_film)",
                "https://www.rottentomatoes.com/m/dune_2021",
            ]
        );
        assert_eq!(hits[0].title, "Dune (2021) - IMDb");
    }

    #[test]
    fn test_parse_results_honours_limit() {
        assert_eq!(DuckDuckGoProvider::parse_results(RESULTS_PAGE, 1).len(), 1);
    }

    #[test]
    fn test_parse_results_tolerates_garbage() {
        assert!(DuckDuckGoProvider::parse_results("<div><a class=result__a", 5).is_empty());
    }

    #[tokio::test]
    async fn test_search_encodes_query_and_region() {
        let client = Arc::new(StaticHttpClient::new());
        client.respond(
            "https://html.duckduckgo.com/html/?q=Dune%20film%20movie&kl=us-en",
            HttpResponse::new(200, RESULTS_PAGE),
        );
        let provider = DuckDuckGoProvider::new(client, "us-en", Duration::from_secs(10));

        let hits = provider.search("Dune film movie", 5).await.unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[tokio::test]
    async fn test_search_blocked_is_provider_error() {
        let client = Arc::new(StaticHttpClient::new());
        client.respond(
            "https://html.duckduckgo.com/html/?q=Dune&kl=us-en",
            HttpResponse::new(403, ""),
        );
        let provider = DuckDuckGoProvider::new(client, "us-en", Duration::from_secs(10));

        let err = provider.search("Dune", 5).await.unwrap_err();
        assert!(matches!(err, EnrichmentError::ProviderError { .. }));
    }
}
