//! Error types for the resolution pipeline.
//!
//! None of these escape [`crate::MetadataResolver::enrich`]; they are turned
//! into diagnostics and a degraded [`crate::EnrichmentResult`] instead.

use thiserror::Error;

/// Errors raised by individual pipeline stages.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    /// A search provider failed, timed out or returned garbage.
    #[error("Provider '{provider}' failed: {reason}")]
    ProviderError {
        /// Name of the provider that failed
        provider: String,
        /// The reason for the failure
        reason: String,
    },

    /// Network communication with a page failed.
    #[error("Fetch failed for {url}: {reason}")]
    FetchError {
        /// URL that could not be retrieved
        url: String,
        /// The reason for the failure
        reason: String,
    },

    /// A page answered with a non-success status.
    #[error("HTTP {status} for {url}")]
    HttpStatus {
        /// URL that was requested
        url: String,
        /// Status code returned
        status: u16,
    },

    /// A network operation ran past its deadline.
    #[error("Timed out waiting for {url}")]
    Timeout {
        /// URL that was requested
        url: String,
    },

    /// Response data could not be understood.
    #[error("Parse error: {reason}")]
    ParseError {
        /// The reason for the parse error
        reason: String,
    },

    /// A request was rejected before entering the pipeline.
    #[error("Invalid request: {reason}")]
    InvalidRequest {
        /// Why the request was rejected
        reason: String,
    },
}

impl EnrichmentError {
    /// Wraps any stage error as a failure of the named provider.
    pub fn for_provider(provider: &str, err: EnrichmentError) -> Self {
        match err {
            already @ EnrichmentError::ProviderError { .. } => already,
            other => EnrichmentError::ProviderError {
                provider: provider.to_string(),
                reason: other.to_string(),
            },
        }
    }

    /// Whether the failure was caused by a deadline rather than the remote side.
    pub fn is_timeout(&self) -> bool {
        matches!(self, EnrichmentError::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_provider_wraps_fetch_errors() {
        let err = EnrichmentError::for_provider(
            "duckduckgo",
            EnrichmentError::HttpStatus {
                url: "https://html.duckduckgo.com/html/".to_string(),
                status: 403,
            },
        );

        assert_eq!(
            err.to_string(),
            "Provider 'duckduckgo' failed: HTTP 403 for https://html.duckduckgo.com/html/"
        );
    }

    #[test]
    fn test_for_provider_keeps_provider_errors() {
        let err = EnrichmentError::for_provider(
            "google",
            EnrichmentError::ProviderError {
                provider: "inner".to_string(),
                reason: "blocked".to_string(),
            },
        );

        assert!(matches!(err, EnrichmentError::ProviderError { ref provider, .. } if provider == "inner"));
    }
}
