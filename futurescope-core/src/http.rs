//! HTTP seam used by search providers, the page fetcher and the URL probe.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};

use crate::config::NetworkConfig;
use crate::errors::EnrichmentError;

/// Status and decoded body of one GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal GET client.
///
/// Implementations must give up once `timeout` elapses so that a slow
/// endpoint cannot stall the provider cascade.
#[async_trait]
pub trait HttpClient: Send + Sync + std::fmt::Debug {
    /// Performs a GET request.
    ///
    /// # Errors
    /// - `EnrichmentError::Timeout` - No complete response within `timeout`
    /// - `EnrichmentError::FetchError` - Connection, TLS or body decoding failed
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, EnrichmentError>;
}

/// `reqwest`-backed client with a browser-like identity.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Builds a client from network settings.
    ///
    /// # Errors
    /// - `EnrichmentError::FetchError` - TLS backend could not be initialised
    pub fn new(config: &NetworkConfig) -> Result<Self, EnrichmentError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| EnrichmentError::FetchError {
                url: String::new(),
                reason: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, EnrichmentError> {
        let request = async {
            let response = self.client.get(url).send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>(HttpResponse { status, body })
        };

        match tokio::time::timeout(timeout, request).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) if e.is_timeout() => Err(EnrichmentError::Timeout {
                url: url.to_string(),
            }),
            Ok(Err(e)) => Err(EnrichmentError::FetchError {
                url: url.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(EnrichmentError::Timeout {
                url: url.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(404, "").is_success());
    }

    #[test]
    fn test_client_builds_from_defaults() {
        assert!(ReqwestClient::new(&NetworkConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_contained() {
        let client = ReqwestClient::new(&NetworkConfig::default()).unwrap();
        let result = client
            .get("http://127.0.0.1:9/unreachable", Duration::from_secs(2))
            .await;

        assert!(result.is_err());
    }
}
