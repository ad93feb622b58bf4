//! End-to-end resolution of a title to an [`EnrichmentResult`].
//!
//! normalize → cascade → fetch → {metadata, infobox} → assemble
//!
//! The resolver holds no per-call state, so one instance can serve
//! concurrent calls.

use std::sync::Arc;

use scraper::Html;

use crate::assembler::ResultAssembler;
use crate::cascade::{CascadeStep, ProviderCascade, Resolution, SelectionPolicy};
use crate::config::FuturescopeConfig;
use crate::domains::{classify, is_encyclopedia};
use crate::errors::EnrichmentError;
use crate::extract::{MetadataExtractor, extract_infobox};
use crate::fetcher::PageFetcher;
use crate::http::{HttpClient, ReqwestClient};
use crate::observe::{Diagnostic, DiagnosticSink, TracingSink};
use crate::providers::{DuckDuckGoProvider, GoogleProvider};
use crate::query::QueryNormalizer;
use crate::types::{
    CandidateUrl, CategoryKind, EnrichmentRequest, EnrichmentResult, InfoboxFields, PageMetadata,
};

/// Resolves free-text titles to page metadata.
#[derive(Debug, Clone)]
pub struct MetadataResolver {
    normalizer: QueryNormalizer,
    cascade: ProviderCascade,
    fetcher: PageFetcher,
    extractor: MetadataExtractor,
    assembler: ResultAssembler,
    sink: Arc<dyn DiagnosticSink>,
}

impl MetadataResolver {
    /// Creates a resolver backed by real HTTP, DuckDuckGo and Google.
    ///
    /// # Errors
    /// - `EnrichmentError::FetchError` - HTTP client could not be constructed
    pub fn new(config: FuturescopeConfig) -> Result<Self, EnrichmentError> {
        let http: Arc<dyn HttpClient> = Arc::new(ReqwestClient::new(&config.network)?);

        let steps = vec![
            CascadeStep::new(
                Arc::new(DuckDuckGoProvider::new(
                    http.clone(),
                    config.search.region.clone(),
                    config.network.search_timeout,
                )),
                SelectionPolicy::PreferEncyclopedia,
            ),
            CascadeStep::new(
                Arc::new(GoogleProvider::new(
                    http.clone(),
                    config.search.language.clone(),
                    config.network.search_timeout,
                )),
                SelectionPolicy::FirstTrusted,
            ),
        ];

        Ok(Self::from_parts(&config, http, steps))
    }

    /// Creates a resolver over caller-supplied HTTP and search steps.
    pub fn from_parts(
        config: &FuturescopeConfig,
        http: Arc<dyn HttpClient>,
        steps: Vec<CascadeStep>,
    ) -> Self {
        let fetcher = PageFetcher::new(
            http,
            config.network.fetch_timeout,
            config.network.probe_timeout,
        );

        let cascade = ProviderCascade::new(
            steps,
            fetcher.clone(),
            config.search.max_results,
            config.network.search_timeout,
            config.search.encyclopedia_base.clone(),
        );

        Self {
            normalizer: QueryNormalizer::default(),
            cascade,
            fetcher,
            extractor: MetadataExtractor::new(config.extraction.image_fallback),
            assembler: ResultAssembler,
            sink: Arc::new(TracingSink),
        }
    }

    /// Replaces the default `tracing` sink.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replaces the context-suffix policy.
    pub fn with_normalizer(mut self, normalizer: QueryNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Resolves `request`, reporting to the resolver's own sink.
    pub async fn enrich(&self, request: &EnrichmentRequest) -> EnrichmentResult {
        self.enrich_with_sink(request, self.sink.as_ref()).await
    }

    /// Resolves `request`, reporting to `sink`.
    ///
    /// Never fails: every provider, network and parsing problem degrades the
    /// returned record instead.
    pub async fn enrich_with_sink(
        &self,
        request: &EnrichmentRequest,
        sink: &dyn DiagnosticSink,
    ) -> EnrichmentResult {
        let resolved = self.normalizer.normalize(request, sink);
        let original_query = resolved.original_query.as_str();

        if original_query.is_empty() {
            sink.record(&Diagnostic::NoUrlResolved);
            return self.assembler.unresolved(original_query, sink);
        }

        let resolution = match &resolved.direct_target {
            Some(url) => Some(Resolution::unfetched(CandidateUrl::new(
                url.clone(),
                classify(url),
            ))),
            None => self.cascade.resolve(&resolved, sink).await,
        };

        let Some(Resolution { candidate, page }) = resolution else {
            return self.assembler.unresolved(original_query, sink);
        };

        let fetched = match page {
            Some(body) => Ok(body),
            None => self.fetcher.fetch(&candidate.url).await,
        };

        let body = match fetched {
            Ok(body) => body,
            Err(e) => {
                sink.record(&Diagnostic::FetchFailed {
                    url: candidate.url.clone(),
                    reason: e.to_string(),
                });
                return self.assembler.fetch_failed(original_query, &candidate.url, sink);
            }
        };

        let (metadata, infobox) = self.extract(
            &body,
            &candidate.url,
            original_query,
            request.category_kind,
            sink,
        );

        self.assembler
            .assemble(original_query, &candidate.url, metadata, infobox, sink)
    }

    fn extract(
        &self,
        body: &str,
        url: &str,
        original_query: &str,
        kind: CategoryKind,
        sink: &dyn DiagnosticSink,
    ) -> (PageMetadata, InfoboxFields) {
        let document = Html::parse_document(body);
        let metadata = self.extractor.extract(&document, original_query);

        let infobox = if is_encyclopedia(url) {
            let fields = extract_infobox(&document, kind);
            sink.record(&Diagnostic::InfoboxExtracted {
                creator: fields.creator.is_some(),
                release_year: fields.release_year.is_some(),
                related_work: fields.related_work.is_some(),
            });
            fields
        } else {
            InfoboxFields::default()
        };

        (metadata, infobox)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::http::HttpResponse;
    use crate::observe::MemorySink;
    use crate::providers::ScriptedProvider;
    use crate::providers::scripted::StaticHttpClient;

    const DUNE_PAGE: &str = r#"<html><head>
        <title>Dune (2021 film) - Wikipedia</title>
        <meta property="og:image" content="https://upload.wikimedia.org/dune.jpg">
        <meta name="description" content="Dune is a 2021 American epic science fiction film.">
        </head><body>
        <table class="infobox"><tbody>
          <tr><th>Directed by</th><td>Denis Villeneuve</td></tr>
          <tr><th>Release date</th><td>October 22, 2021</td></tr>
        </tbody></table></body></html>"#;

    fn resolver(
        primary: Arc<ScriptedProvider>,
        http: Arc<StaticHttpClient>,
    ) -> MetadataResolver {
        let config = FuturescopeConfig::default().with_uniform_timeout(Duration::from_secs(1));
        MetadataResolver::from_parts(
            &config,
            http,
            vec![
                CascadeStep::new(primary, SelectionPolicy::PreferEncyclopedia),
                CascadeStep::new(
                    Arc::new(ScriptedProvider::failing("google", "blocked")),
                    SelectionPolicy::FirstTrusted,
                ),
            ],
        )
    }

    #[tokio::test]
    async fn test_dune_scenario() {
        let url = "https://en.wikipedia.org/wiki/Dune_(2021_film)";
        let primary = Arc::new(ScriptedProvider::returning("duckduckgo", &[url]));
        let http = Arc::new(StaticHttpClient::new());
        http.page(url, DUNE_PAGE);

        let result = resolver(primary.clone(), http)
            .enrich(&EnrichmentRequest::new("Dune", CategoryKind::Watch, "Movies"))
            .await;

        assert_eq!(primary.queries(), vec!["Dune film movie"]);
        assert_eq!(result.name, "Dune (2021 film)");
        assert_eq!(result.link, url);
        assert_eq!(result.creator.as_deref(), Some("Denis Villeneuve"));
        assert_eq!(result.release_year.as_deref(), Some("2021"));
        assert_eq!(
            result.image_url.as_deref(),
            Some("https://upload.wikimedia.org/dune.jpg")
        );
    }

    #[tokio::test]
    async fn test_direct_url_skips_search() {
        let primary = Arc::new(ScriptedProvider::returning("duckduckgo", &[]));
        let http = Arc::new(StaticHttpClient::new());
        http.page(
            "https://example.com/page",
            r#"<html><head><meta property="og:description" content="An example."></head></html>"#,
        );

        let result = resolver(primary.clone(), http.clone())
            .enrich(&EnrichmentRequest::new(
                "https://example.com/page",
                CategoryKind::General,
                "",
            ))
            .await;

        assert_eq!(primary.calls(), 0);
        assert_eq!(http.requests(), vec!["https://example.com/page"]);
        assert_eq!(result.summary, "An example.");
    }

    #[tokio::test]
    async fn test_infobox_ignored_off_encyclopedia() {
        let url = "https://www.imdb.com/title/tt1160419/";
        let primary = Arc::new(ScriptedProvider::returning("duckduckgo", &[url]));
        let http = Arc::new(StaticHttpClient::new());
        http.page(url, DUNE_PAGE);

        let result = resolver(primary, http)
            .enrich(&EnrichmentRequest::new("Dune", CategoryKind::Watch, "Movies"))
            .await;

        assert!(result.is_enriched());
        assert_eq!(result.creator, None);
        assert_eq!(result.release_year, None);
    }

    #[tokio::test]
    async fn test_fetch_failure_preserves_link() {
        let url = "https://en.wikipedia.org/wiki/Dune_(2021_film)";
        let primary = Arc::new(ScriptedProvider::returning("duckduckgo", &[url]));
        let http = Arc::new(StaticHttpClient::new());
        http.respond(url, HttpResponse::new(500, "oops"));
        let sink = MemorySink::new();

        let result = resolver(primary, http)
            .enrich_with_sink(
                &EnrichmentRequest::new("Dune", CategoryKind::Watch, "Movies"),
                &sink,
            )
            .await;

        assert_eq!(result, EnrichmentResult::bare("Dune", url));
        assert!(
            sink.events()
                .iter()
                .any(|event| matches!(event, Diagnostic::FetchFailed { .. }))
        );
    }

    #[tokio::test]
    async fn test_blank_query_short_circuits() {
        let primary = Arc::new(ScriptedProvider::returning("duckduckgo", &["https://a.example/"]));
        let http = Arc::new(StaticHttpClient::new());

        let result = resolver(primary.clone(), http.clone())
            .enrich(&EnrichmentRequest::new("   ", CategoryKind::Read, "Books"))
            .await;

        assert_eq!(result, EnrichmentResult::default());
        assert_eq!(primary.calls(), 0);
        assert!(http.requests().is_empty());
    }

    #[tokio::test]
    async fn test_stalled_page_fetch_times_out() {
        let url = "https://en.wikipedia.org/wiki/Dune_(2021_film)";
        let primary = Arc::new(ScriptedProvider::returning("duckduckgo", &[url]));
        let http = Arc::new(StaticHttpClient::new());
        http.stall(url);
        let sink = MemorySink::new();

        let request = EnrichmentRequest::new("Dune", CategoryKind::Watch, "Movies");
        let resolver = resolver(primary, http);
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            resolver.enrich_with_sink(&request, &sink),
        )
        .await
        .expect("enrich must return once the fetch deadline passes");

        assert_eq!(result, EnrichmentResult::bare("Dune", url));
        assert!(sink.events().iter().any(|event| matches!(
            event,
            Diagnostic::FetchFailed { reason, .. } if reason.starts_with("Timed out")
        )));
    }

    #[tokio::test]
    async fn test_stalled_guess_probe_is_rejected() {
        let guess = "https://en.wikipedia.org/wiki/Dune";
        let primary = Arc::new(ScriptedProvider::failing("duckduckgo", "blocked"));
        let http = Arc::new(StaticHttpClient::new());
        http.stall(guess);
        let sink = MemorySink::new();

        let request = EnrichmentRequest::new("Dune", CategoryKind::Read, "Books");
        let resolver = resolver(primary, http.clone());
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            resolver.enrich_with_sink(&request, &sink),
        )
        .await
        .expect("enrich must return once the probe deadline passes");

        assert_eq!(result, EnrichmentResult::bare("Dune", ""));
        assert_eq!(http.requests(), vec![guess]);
        assert!(sink.events().contains(&Diagnostic::GuessProbed {
            url: guess.to_string(),
            accepted: false,
        }));
    }
}
