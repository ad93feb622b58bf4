//! Diagnostic trail for resolution calls.
//!
//! Every stage reports what it tried and why it moved on through a
//! [`DiagnosticSink`] handed to the pipeline. Nothing here ends up in the
//! returned [`crate::EnrichmentResult`].

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::types::SourceProvider;

/// One step of a resolution call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Normalizer finished; `search_query` may carry a context suffix.
    QueryNormalized {
        original_query: String,
        search_query: String,
    },
    /// A suffix existed but the query already carried one of its keywords.
    ContextSkipped { suffix: &'static str },
    /// The query itself is a URL; search is bypassed.
    DirectTarget { url: String },
    /// A provider call failed or timed out.
    ProviderFailed { provider: String, reason: String },
    /// A provider returned no usable results.
    ProviderEmpty { provider: String },
    /// A search result was inspected.
    CandidateSeen { provider: String, url: String },
    /// The cascade settled on a URL.
    CandidateSelected {
        url: String,
        source: SourceProvider,
    },
    /// The guessed encyclopedia URL was probed.
    GuessProbed { url: String, accepted: bool },
    /// No step of the cascade produced a URL.
    NoUrlResolved,
    /// The resolved page could not be fetched.
    FetchFailed { url: String, reason: String },
    /// Infobox fields were read from an encyclopedia page.
    InfoboxExtracted {
        creator: bool,
        release_year: bool,
        related_work: bool,
    },
    /// Final record produced.
    Assembled { name: String, enriched: bool },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::QueryNormalized {
                original_query,
                search_query,
            } => write!(f, "query '{original_query}' -> search '{search_query}'"),
            Diagnostic::ContextSkipped { suffix } => {
                write!(f, "context '{}' skipped, already present", suffix.trim())
            }
            Diagnostic::DirectTarget { url } => write!(f, "direct target {url}"),
            Diagnostic::ProviderFailed { provider, reason } => {
                write!(f, "{provider} failed: {reason}")
            }
            Diagnostic::ProviderEmpty { provider } => write!(f, "{provider} returned nothing"),
            Diagnostic::CandidateSeen { provider, url } => write!(f, "{provider} candidate {url}"),
            Diagnostic::CandidateSelected { url, source } => {
                write!(f, "selected {url} ({source:?})")
            }
            Diagnostic::GuessProbed { url, accepted } => {
                let verdict = if *accepted { "exists" } else { "rejected" };
                write!(f, "guessed {url}: {verdict}")
            }
            Diagnostic::NoUrlResolved => write!(f, "no URL resolved"),
            Diagnostic::FetchFailed { url, reason } => write!(f, "fetch {url} failed: {reason}"),
            Diagnostic::InfoboxExtracted {
                creator,
                release_year,
                related_work,
            } => write!(
                f,
                "infobox creator={creator} year={release_year} related={related_work}"
            ),
            Diagnostic::Assembled { name, enriched } => {
                write!(f, "assembled '{name}' (enriched={enriched})")
            }
        }
    }
}

/// Receiver of pipeline diagnostics.
pub trait DiagnosticSink: Send + Sync + fmt::Debug {
    /// Records one diagnostic event.
    fn record(&self, diagnostic: &Diagnostic);
}

/// Forwards diagnostics to `tracing` at a level matching their severity.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, diagnostic: &Diagnostic) {
        match diagnostic {
            Diagnostic::ProviderFailed { .. } | Diagnostic::FetchFailed { .. } => {
                tracing::warn!(target: "futurescope::pipeline", "{diagnostic}");
            }
            Diagnostic::CandidateSelected { .. }
            | Diagnostic::NoUrlResolved
            | Diagnostic::Assembled { .. } => {
                tracing::info!(target: "futurescope::pipeline", "{diagnostic}");
            }
            _ => tracing::debug!(target: "futurescope::pipeline", "{diagnostic}"),
        }
    }
}

/// Keeps every diagnostic in memory and optionally forwards to another sink.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Diagnostic>>,
    forward: Option<Arc<dyn DiagnosticSink>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects events and also passes them on to `forward`.
    pub fn forwarding_to(forward: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            forward: Some(forward),
        }
    }

    /// Copy of everything recorded so far.
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events.lock().clone()
    }

    /// Drains the recorded events.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, diagnostic: &Diagnostic) {
        self.events.lock().push(diagnostic.clone());
        if let Some(forward) = &self.forward {
            forward.record(diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_collects_in_order() {
        let sink = MemorySink::new();
        sink.record(&Diagnostic::NoUrlResolved);
        sink.record(&Diagnostic::Assembled {
            name: "Dune".to_string(),
            enriched: false,
        });

        let events = sink.take();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], Diagnostic::NoUrlResolved);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_memory_sink_forwards() {
        let inner = Arc::new(MemorySink::new());
        let outer = MemorySink::forwarding_to(inner.clone());

        outer.record(&Diagnostic::NoUrlResolved);

        assert_eq!(inner.events(), vec![Diagnostic::NoUrlResolved]);
        assert_eq!(outer.events(), vec![Diagnostic::NoUrlResolved]);
    }

    #[test]
    fn test_display_is_readable() {
        let diagnostic = Diagnostic::GuessProbed {
            url: "https://en.wikipedia.org/wiki/Dune".to_string(),
            accepted: false,
        };
        assert_eq!(
            diagnostic.to_string(),
            "guessed https://en.wikipedia.org/wiki/Dune: rejected"
        );
    }
}
