//! Provider cascade: ordered search attempts ending in a guessed URL.
//!
//! Each step is isolated. A failing, hanging or empty provider only moves
//! the cascade on to the next step, and no step is retried.

use std::sync::Arc;
use std::time::Duration;

use crate::domains::classify;
use crate::fetcher::PageFetcher;
use crate::observe::{Diagnostic, DiagnosticSink};
use crate::providers::{SearchHit, SearchProvider};
use crate::types::{CandidateUrl, ResolvedQuery, SourceProvider};

/// How a search step picks one URL out of its ranked hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// An encyclopedia hit wins immediately; otherwise the first
    /// domain-database hit, otherwise the first hit.
    PreferEncyclopedia,
    /// The first hit on any trusted domain wins; otherwise the first hit.
    FirstTrusted,
}

impl SelectionPolicy {
    /// Applies the policy to hits in ranked order.
    pub fn select(self, hits: &[SearchHit]) -> Option<CandidateUrl> {
        let mut backup: Option<CandidateUrl> = None;
        let mut first_seen: Option<CandidateUrl> = None;

        for hit in hits {
            let class = classify(&hit.url);
            let candidate = CandidateUrl::new(hit.url.clone(), class);

            match (self, class) {
                (_, SourceProvider::Wikipedia) => return Some(candidate),
                (SelectionPolicy::FirstTrusted, SourceProvider::ImdbLike | SourceProvider::AnimeDb) => {
                    return Some(candidate);
                }
                (SelectionPolicy::PreferEncyclopedia, SourceProvider::ImdbLike | SourceProvider::AnimeDb) => {
                    if backup.is_none() {
                        backup = Some(candidate.clone());
                    }
                }
                _ => {}
            }

            if first_seen.is_none() {
                first_seen = Some(candidate);
            }
        }

        backup.or(first_seen)
    }
}

/// One search step of the cascade.
#[derive(Debug, Clone)]
pub struct CascadeStep {
    pub provider: Arc<dyn SearchProvider>,
    pub policy: SelectionPolicy,
}

impl CascadeStep {
    pub fn new(provider: Arc<dyn SearchProvider>, policy: SelectionPolicy) -> Self {
        Self { provider, policy }
    }
}

/// Outcome of a successful cascade run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub candidate: CandidateUrl,
    /// Page body, when resolving already had to download it
    pub page: Option<String>,
}

impl Resolution {
    pub fn unfetched(candidate: CandidateUrl) -> Self {
        Self {
            candidate,
            page: None,
        }
    }
}

/// Resolves a query to a single candidate URL.
#[derive(Debug, Clone)]
pub struct ProviderCascade {
    steps: Vec<CascadeStep>,
    fetcher: PageFetcher,
    max_results: usize,
    search_timeout: Duration,
    encyclopedia_base: String,
}

impl ProviderCascade {
    pub fn new(
        steps: Vec<CascadeStep>,
        fetcher: PageFetcher,
        max_results: usize,
        search_timeout: Duration,
        encyclopedia_base: impl Into<String>,
    ) -> Self {
        Self {
            steps,
            fetcher,
            max_results,
            search_timeout,
            encyclopedia_base: encyclopedia_base.into(),
        }
    }

    /// Runs the search steps, then the guess. `None` means nothing resolved.
    pub async fn resolve(
        &self,
        query: &ResolvedQuery,
        sink: &dyn DiagnosticSink,
    ) -> Option<Resolution> {
        let mut resolution = None;
        for step in &self.steps {
            if let Some(candidate) = self.run_step(step, &query.search_query, sink).await {
                resolution = Some(Resolution::unfetched(candidate));
                break;
            }
        }

        if resolution.is_none() {
            resolution = self.guess(&query.original_query, sink).await;
        }

        match &resolution {
            Some(Resolution { candidate, .. }) => sink.record(&Diagnostic::CandidateSelected {
                url: candidate.url.clone(),
                source: candidate.source_provider,
            }),
            None => sink.record(&Diagnostic::NoUrlResolved),
        }

        resolution
    }

    async fn run_step(
        &self,
        step: &CascadeStep,
        search_query: &str,
        sink: &dyn DiagnosticSink,
    ) -> Option<CandidateUrl> {
        let provider = step.provider.name().to_string();
        let search = step.provider.search(search_query, self.max_results);

        let hits = match tokio::time::timeout(self.search_timeout, search).await {
            Ok(Ok(hits)) => hits,
            Ok(Err(e)) => {
                sink.record(&Diagnostic::ProviderFailed {
                    provider,
                    reason: e.to_string(),
                });
                return None;
            }
            Err(_) => {
                sink.record(&Diagnostic::ProviderFailed {
                    provider,
                    reason: format!("timed out after {:?}", self.search_timeout),
                });
                return None;
            }
        };

        let hits: Vec<SearchHit> = hits.into_iter().take(self.max_results).collect();
        if hits.is_empty() {
            sink.record(&Diagnostic::ProviderEmpty { provider });
            return None;
        }

        for hit in &hits {
            sink.record(&Diagnostic::CandidateSeen {
                provider: provider.clone(),
                url: hit.url.clone(),
            });
        }

        step.policy.select(&hits)
    }

    async fn guess(&self, original_query: &str, sink: &dyn DiagnosticSink) -> Option<Resolution> {
        let url = guess_encyclopedia_url(&self.encyclopedia_base, original_query)?;
        let page = self.fetcher.probe(&url).await;
        sink.record(&Diagnostic::GuessProbed {
            url: url.clone(),
            accepted: page.is_some(),
        });

        page.map(|body| Resolution {
            candidate: CandidateUrl::new(url, SourceProvider::Guess),
            page: Some(body),
        })
    }
}

/// Builds an article URL by title-casing the words of `query`.
///
/// `"the dark knight"` becomes `<base>The_Dark_Knight`. Returns `None` for a
/// blank query.
pub fn guess_encyclopedia_url(base: &str, query: &str) -> Option<String> {
    let words: Vec<String> = query
        .split_whitespace()
        .map(|word| urlencoding::encode(&title_case(word)).into_owned())
        .collect();

    if words.is_empty() {
        return None;
    }

    Some(format!("{base}{}", words.join("_")))
}

/// Uppercases every letter that follows a non-letter, lowercases the rest.
fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut at_boundary = true;
    for c in word.chars() {
        if at_boundary {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        at_boundary = !c.is_alphabetic();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpResponse;
    use crate::observe::MemorySink;
    use crate::providers::ScriptedProvider;
    use crate::providers::scripted::StaticHttpClient;

    const WIKI: &str = "https://en.wikipedia.org/wiki/";

    fn hits(urls: &[&str]) -> Vec<SearchHit> {
        urls.iter().map(|url| SearchHit::new(*url, "")).collect()
    }

    fn resolved(original: &str, search: &str) -> ResolvedQuery {
        ResolvedQuery {
            original_query: original.to_string(),
            search_query: search.to_string(),
            direct_target: None,
        }
    }

    fn cascade(
        primary: Arc<ScriptedProvider>,
        secondary: Arc<ScriptedProvider>,
        http: Arc<StaticHttpClient>,
    ) -> ProviderCascade {
        let fetcher = PageFetcher::new(http, Duration::from_secs(10), Duration::from_secs(5));
        ProviderCascade::new(
            vec![
                CascadeStep::new(primary, SelectionPolicy::PreferEncyclopedia),
                CascadeStep::new(secondary, SelectionPolicy::FirstTrusted),
            ],
            fetcher,
            5,
            Duration::from_millis(200),
            WIKI,
        )
    }

    #[test]
    fn test_prefer_encyclopedia_short_circuits() {
        let selected = SelectionPolicy::PreferEncyclopedia
            .select(&hits(&[
                "https://blog.example.com/dune",
                "https://www.imdb.com/title/tt1160419/",
                "https://en.wikipedia.org/wiki/Dune_(2021_film)",
                "https://en.wikipedia.org/wiki/Dune_(novel)",
            ]))
            .unwrap();

        assert_eq!(selected.url, "https://en.wikipedia.org/wiki/Dune_(2021_film)");
        assert_eq!(selected.source_provider, SourceProvider::Wikipedia);
    }

    #[test]
    fn test_prefer_encyclopedia_keeps_first_database_backup() {
        let selected = SelectionPolicy::PreferEncyclopedia
            .select(&hits(&[
                "https://blog.example.com/dune",
                "https://myanimelist.net/anime/1",
                "https://www.imdb.com/title/tt1160419/",
            ]))
            .unwrap();

        assert_eq!(selected.url, "https://myanimelist.net/anime/1");
        assert_eq!(selected.source_provider, SourceProvider::AnimeDb);
    }

    #[test]
    fn test_prefer_encyclopedia_falls_back_to_first_seen() {
        let selected = SelectionPolicy::PreferEncyclopedia
            .select(&hits(&["https://a.example.com/", "https://b.example.com/"]))
            .unwrap();

        assert_eq!(selected.url, "https://a.example.com/");
        assert_eq!(selected.source_provider, SourceProvider::Generic);
    }

    #[test]
    fn test_first_trusted_takes_database_immediately() {
        let selected = SelectionPolicy::FirstTrusted
            .select(&hits(&[
                "https://a.example.com/",
                "https://www.imdb.com/title/tt1/",
                "https://en.wikipedia.org/wiki/X",
            ]))
            .unwrap();

        assert_eq!(selected.url, "https://www.imdb.com/title/tt1/");
    }

    #[test]
    fn test_empty_hits_select_nothing() {
        assert!(SelectionPolicy::PreferEncyclopedia.select(&[]).is_none());
        assert!(SelectionPolicy::FirstTrusted.select(&[]).is_none());
    }

    #[test]
    fn test_guess_url() {
        assert_eq!(
            guess_encyclopedia_url(WIKI, "the dark  KNIGHT").as_deref(),
            Some("https://en.wikipedia.org/wiki/The_Dark_Knight")
        );
        assert_eq!(
            guess_encyclopedia_url(WIKI, "spider-man").as_deref(),
            Some("https://en.wikipedia.org/wiki/Spider-Man")
        );
        assert_eq!(
            guess_encyclopedia_url(WIKI, "ocean's eleven").as_deref(),
            Some("https://en.wikipedia.org/wiki/Ocean%27S_Eleven")
        );
        assert_eq!(guess_encyclopedia_url(WIKI, "   "), None);
    }

    #[tokio::test]
    async fn test_primary_failure_advances_to_secondary() {
        let primary = Arc::new(ScriptedProvider::failing("duckduckgo", "rate limited"));
        let secondary = Arc::new(ScriptedProvider::returning(
            "google",
            &["https://en.wikipedia.org/wiki/Dune_(novel)"],
        ));
        let sink = MemorySink::new();

        let candidate = cascade(primary.clone(), secondary.clone(), Arc::new(StaticHttpClient::new()))
            .resolve(&resolved("Dune", "Dune novel book"), &sink)
            .await
            .unwrap()
            .candidate;

        assert_eq!(candidate.url, "https://en.wikipedia.org/wiki/Dune_(novel)");
        assert_eq!(secondary.queries(), vec!["Dune novel book"]);
        assert!(sink.events().iter().any(|event| matches!(
            event,
            Diagnostic::ProviderFailed { provider, .. } if provider == "duckduckgo"
        )));
    }

    #[tokio::test]
    async fn test_secondary_not_called_when_primary_resolves() {
        let primary = Arc::new(ScriptedProvider::returning("duckduckgo", &["https://a.example.com/"]));
        let secondary = Arc::new(ScriptedProvider::returning("google", &["https://b.example.com/"]));

        let candidate = cascade(primary, secondary.clone(), Arc::new(StaticHttpClient::new()))
            .resolve(&resolved("Dune", "Dune"), &MemorySink::new())
            .await
            .unwrap()
            .candidate;

        assert_eq!(candidate.url, "https://a.example.com/");
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn test_hanging_provider_times_out() {
        let primary = Arc::new(ScriptedProvider::hanging("duckduckgo"));
        let secondary = Arc::new(ScriptedProvider::returning("google", &["https://b.example.com/"]));

        let candidate = cascade(primary, secondary, Arc::new(StaticHttpClient::new()))
            .resolve(&resolved("Dune", "Dune"), &MemorySink::new())
            .await
            .unwrap()
            .candidate;

        assert_eq!(candidate.url, "https://b.example.com/");
    }

    #[tokio::test]
    async fn test_guess_uses_original_query() {
        let http = Arc::new(StaticHttpClient::new());
        http.respond(
            "https://en.wikipedia.org/wiki/Spirited_Away",
            HttpResponse::new(200, "<html></html>"),
        );
        let sink = MemorySink::new();

        let resolution = cascade(
            Arc::new(ScriptedProvider::returning("duckduckgo", &[])),
            Arc::new(ScriptedProvider::failing("google", "blocked")),
            http.clone(),
        )
        .resolve(&resolved("spirited away", "spirited away anime"), &sink)
        .await
        .unwrap();

        assert_eq!(resolution.candidate.url, "https://en.wikipedia.org/wiki/Spirited_Away");
        assert_eq!(resolution.candidate.source_provider, SourceProvider::Guess);
        assert_eq!(resolution.page.as_deref(), Some("<html></html>"));
        assert_eq!(http.requests(), vec!["https://en.wikipedia.org/wiki/Spirited_Away"]);
    }

    #[tokio::test]
    async fn test_everything_fails() {
        let http = Arc::new(StaticHttpClient::new());
        http.respond(
            "https://en.wikipedia.org/wiki/Xyzzy",
            HttpResponse::new(404, "missing"),
        );
        let sink = MemorySink::new();

        let candidate = cascade(
            Arc::new(ScriptedProvider::failing("duckduckgo", "down")),
            Arc::new(ScriptedProvider::failing("google", "down")),
            http,
        )
        .resolve(&resolved("xyzzy", "xyzzy"), &sink)
        .await;

        assert!(candidate.is_none());
        assert_eq!(sink.events().last(), Some(&Diagnostic::NoUrlResolved));
    }
}
