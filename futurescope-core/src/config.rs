//! Centralized configuration for Futurescope.
//!
//! All tunable parameters for the resolution pipeline live here so that
//! timeouts and provider settings are not scattered across modules.

use std::time::Duration;

/// Central configuration for the resolution pipeline.
///
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct FuturescopeConfig {
    pub network: NetworkConfig,
    pub search: SearchConfig,
    pub extraction: ExtractionConfig,
}

/// Timeouts and HTTP client identity.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Deadline for a single search provider query
    pub search_timeout: Duration,
    /// Deadline for fetching the resolved page
    pub fetch_timeout: Duration,
    /// Deadline for the guessed-URL existence probe
    pub probe_timeout: Duration,
    /// Browser-like user agent; many sites reject library defaults
    pub user_agent: &'static str,
    /// Redirects followed before giving up
    pub max_redirects: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            search_timeout: Duration::from_secs(10),
            fetch_timeout: Duration::from_secs(10),
            probe_timeout: Duration::from_secs(5),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            max_redirects: 5,
        }
    }
}

/// Search provider parameters.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Results scanned per provider
    pub max_results: usize,
    /// Region hint for the primary provider
    pub region: String,
    /// Language hint for the secondary provider
    pub language: String,
    /// Prefix for guessed encyclopedia article URLs
    pub encyclopedia_base: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            region: "us-en".to_string(),
            language: "en".to_string(),
            encyclopedia_base: "https://en.wikipedia.org/wiki/".to_string(),
        }
    }
}

/// HTML extraction switches.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Fall back to the first inline `<img>` when no preview image exists
    pub image_fallback: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            image_fallback: true,
        }
    }
}

impl FuturescopeConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Unparseable values are ignored and the default is kept.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(seconds) = env_parse::<u64>("FUTURESCOPE_SEARCH_TIMEOUT") {
            config.network.search_timeout = Duration::from_secs(seconds);
        }

        if let Some(seconds) = env_parse::<u64>("FUTURESCOPE_FETCH_TIMEOUT") {
            config.network.fetch_timeout = Duration::from_secs(seconds);
        }

        if let Some(seconds) = env_parse::<u64>("FUTURESCOPE_PROBE_TIMEOUT") {
            config.network.probe_timeout = Duration::from_secs(seconds);
        }

        if let Some(count) = env_parse::<usize>("FUTURESCOPE_MAX_RESULTS")
            && count > 0
        {
            config.search.max_results = count;
        }

        if let Ok(region) = std::env::var("FUTURESCOPE_REGION")
            && !region.trim().is_empty()
        {
            config.search.region = region.trim().to_string();
        }

        if let Some(enabled) = env_parse::<bool>("FUTURESCOPE_IMAGE_FALLBACK") {
            config.extraction.image_fallback = enabled;
        }

        config
    }

    /// Applies one timeout to every network operation.
    pub fn with_uniform_timeout(mut self, timeout: Duration) -> Self {
        self.network.search_timeout = timeout;
        self.network.fetch_timeout = timeout;
        self.network.probe_timeout = timeout;
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.trim().parse().ok()
}
