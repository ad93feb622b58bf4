//! Query normalization: turns a raw title into a search string.
//!
//! Search engines disambiguate poorly on bare titles ("Dune" is a novel, two
//! films and a game), so the list the title lives in contributes a short
//! context suffix. The suffix is chosen from [`CONTEXT_RULES`].

use std::sync::LazyLock;

use regex::Regex;

use crate::observe::{Diagnostic, DiagnosticSink};
use crate::types::{CategoryKind, EnrichmentRequest, ResolvedQuery};

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://\S+$").expect("URL pattern is valid")
});

/// One row of the context-suffix policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextRule {
    /// Category kind the rule applies to
    pub kind: CategoryKind,
    /// Matches when the lowercased label contains any of these; empty matches always
    pub label_keywords: &'static [&'static str],
    /// Appended to the query, leading space included
    pub suffix: &'static str,
}

impl ContextRule {
    fn matches(&self, kind: CategoryKind, label_lower: &str) -> bool {
        self.kind == kind
            && (self.label_keywords.is_empty()
                || self
                    .label_keywords
                    .iter()
                    .any(|keyword| label_lower.contains(keyword)))
    }

    /// Words of the suffix; any of them already in the query suppresses it.
    pub fn keywords(&self) -> impl Iterator<Item = &'static str> {
        self.suffix.split_whitespace()
    }
}

/// Context suffix policy, first matching row wins.
pub const CONTEXT_RULES: &[ContextRule] = &[
    ContextRule {
        kind: CategoryKind::Read,
        label_keywords: &["manga"],
        suffix: " manga",
    },
    ContextRule {
        kind: CategoryKind::Read,
        label_keywords: &["comic"],
        suffix: " comic",
    },
    ContextRule {
        kind: CategoryKind::Read,
        label_keywords: &[],
        suffix: " novel book",
    },
    ContextRule {
        kind: CategoryKind::Watch,
        label_keywords: &["anime"],
        suffix: " anime",
    },
    ContextRule {
        kind: CategoryKind::Watch,
        label_keywords: &["series", "show"],
        suffix: " tv series",
    },
    ContextRule {
        kind: CategoryKind::Watch,
        label_keywords: &[],
        suffix: " film movie",
    },
];

/// Whether `query` is already a `scheme://...` target.
pub fn is_url_like(query: &str) -> bool {
    URL_PATTERN.is_match(query.trim())
}

/// Chooses search context for a request.
#[derive(Debug, Clone)]
pub struct QueryNormalizer {
    rules: &'static [ContextRule],
}

impl Default for QueryNormalizer {
    fn default() -> Self {
        Self::new(CONTEXT_RULES)
    }
}

impl QueryNormalizer {
    /// Creates a normalizer over a custom policy table.
    pub fn new(rules: &'static [ContextRule]) -> Self {
        Self { rules }
    }

    /// Finds the rule for a kind/label pair; `general` never matches.
    pub fn rule_for(&self, kind: CategoryKind, label: &str) -> Option<&'static ContextRule> {
        let label_lower = label.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(kind, &label_lower))
    }

    /// Produces the search query for `request`.
    ///
    /// URL-like queries pass through untouched and become the direct target.
    pub fn normalize(
        &self,
        request: &EnrichmentRequest,
        sink: &dyn DiagnosticSink,
    ) -> ResolvedQuery {
        let original_query = request.raw_query.trim().to_string();

        if is_url_like(&original_query) {
            sink.record(&Diagnostic::DirectTarget {
                url: original_query.clone(),
            });
            return ResolvedQuery {
                search_query: original_query.clone(),
                direct_target: Some(original_query.clone()),
                original_query,
            };
        }

        let mut search_query = original_query.clone();
        if let Some(rule) = self.rule_for(request.category_kind, &request.category_label) {
            let query_lower = original_query.to_lowercase();
            if rule.keywords().any(|keyword| query_lower.contains(keyword)) {
                sink.record(&Diagnostic::ContextSkipped {
                    suffix: rule.suffix,
                });
            } else {
                search_query.push_str(rule.suffix);
            }
        }

        sink.record(&Diagnostic::QueryNormalized {
            original_query: original_query.clone(),
            search_query: search_query.clone(),
        });

        ResolvedQuery {
            original_query,
            search_query,
            direct_target: None,
        }
    }
}
