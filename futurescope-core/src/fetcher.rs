//! Page retrieval under a bounded timeout.

use std::sync::Arc;
use std::time::Duration;

use crate::errors::EnrichmentError;
use crate::http::HttpClient;

/// Retrieves resolved pages and probes guessed URLs.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Arc<dyn HttpClient>,
    fetch_timeout: Duration,
    probe_timeout: Duration,
}

impl PageFetcher {
    pub fn new(client: Arc<dyn HttpClient>, fetch_timeout: Duration, probe_timeout: Duration) -> Self {
        Self {
            client,
            fetch_timeout,
            probe_timeout,
        }
    }

    /// Fetches the HTML at `url`.
    ///
    /// # Errors
    /// - `EnrichmentError::HttpStatus` - Server answered with a non-2xx status
    /// - `EnrichmentError::Timeout` - No response within the fetch timeout
    /// - `EnrichmentError::FetchError` - Transport failure
    pub async fn fetch(&self, url: &str) -> Result<String, EnrichmentError> {
        tracing::debug!("Fetching page {url}");
        self.get_within(url, self.fetch_timeout).await
    }

    /// Body of `url` if it answers with a 2xx status in time, otherwise `None`.
    pub async fn probe(&self, url: &str) -> Option<String> {
        match self.get_within(url, self.probe_timeout).await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::debug!("Probe of {url} failed: {e}");
                None
            }
        }
    }

    async fn get_within(&self, url: &str, deadline: Duration) -> Result<String, EnrichmentError> {
        let response = tokio::time::timeout(deadline, self.client.get(url, deadline))
            .await
            .map_err(|_| EnrichmentError::Timeout {
                url: url.to_string(),
            })??;

        if !response.is_success() {
            return Err(EnrichmentError::HttpStatus {
                url: url.to_string(),
                status: response.status,
            });
        }

        Ok(response.body)
    }
}
