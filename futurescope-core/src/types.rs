//! Data types flowing through the resolution pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maximum characters kept in [`EnrichmentResult::name`].
pub const NAME_CAP: usize = 100;
/// Maximum characters kept in [`EnrichmentResult::summary`].
pub const SUMMARY_CAP: usize = 500;
/// Maximum characters kept in [`EnrichmentResult::creator`].
pub const CREATOR_CAP: usize = 100;
/// Maximum characters kept in [`EnrichmentResult::release_year`].
pub const RELEASE_YEAR_CAP: usize = 20;
/// Maximum characters kept in [`EnrichmentResult::related_work`].
pub const RELATED_WORK_CAP: usize = 200;

/// Kind of list a title belongs to, used to pick search context.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    /// Anything without a media-specific hint.
    #[default]
    General,
    /// Films, series and anime.
    Watch,
    /// Novels, manga and comics.
    Read,
}

impl CategoryKind {
    /// Status a freshly added item of this kind starts with.
    pub fn default_status(self) -> &'static str {
        match self {
            CategoryKind::General => "Pending",
            CategoryKind::Watch => "Plan to Watch",
            CategoryKind::Read => "Plan to Read",
        }
    }

    /// Lowercase identifier used on the wire and in the CLI.
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryKind::General => "general",
            CategoryKind::Watch => "watch",
            CategoryKind::Read => "read",
        }
    }
}

impl FromStr for CategoryKind {
    type Err = std::convert::Infallible;

    /// Unknown or empty input falls back to [`CategoryKind::General`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "watch" => CategoryKind::Watch,
            "read" => CategoryKind::Read,
            _ => CategoryKind::General,
        })
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A caller's request to enrich one title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentRequest {
    /// Title (or direct URL) as typed by the user
    pub raw_query: String,
    /// Kind of the list the title lives in
    #[serde(default)]
    pub category_kind: CategoryKind,
    /// Free-text list name, e.g. "Anime to binge"
    #[serde(default)]
    pub category_label: String,
}

impl EnrichmentRequest {
    /// Creates a request; surrounding whitespace in the query is dropped.
    pub fn new(
        raw_query: impl Into<String>,
        category_kind: CategoryKind,
        category_label: impl Into<String>,
    ) -> Self {
        Self {
            raw_query: raw_query.into().trim().to_string(),
            category_kind,
            category_label: category_label.into(),
        }
    }
}

/// Output of the query normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedQuery {
    /// The caller's query, never augmented
    pub original_query: String,
    /// What is sent to search providers
    pub search_query: String,
    /// Set when the original query already is a URL; search is skipped
    pub direct_target: Option<String>,
}

/// Where a candidate URL came from, by domain class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceProvider {
    Wikipedia,
    ImdbLike,
    AnimeDb,
    Generic,
    Guess,
}

/// A URL the cascade settled on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateUrl {
    pub url: String,
    pub source_provider: SourceProvider,
}

impl CandidateUrl {
    pub fn new(url: impl Into<String>, source_provider: SourceProvider) -> Self {
        Self {
            url: url.into(),
            source_provider,
        }
    }
}

/// Structured fields read from an encyclopedia infobox.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoboxFields {
    /// Director for watch lists, author for read lists
    pub creator: Option<String>,
    /// First four-digit run found in a release/publication row
    pub release_year: Option<String>,
    /// Sequel or prequel, verbatim
    pub related_work: Option<String>,
}

impl InfoboxFields {
    /// True when no field was found.
    pub fn is_empty(&self) -> bool {
        self.creator.is_none() && self.release_year.is_none() && self.related_work.is_none()
    }
}

/// Generic page metadata pulled from `<head>` and the body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
}

/// Final record handed back to the caller. Always produced, never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    /// Display name (at most 100 characters)
    pub name: String,
    /// Short description (at most 500 characters)
    pub summary: String,
    /// Resolved page, or empty when nothing was resolved
    pub link: String,
    pub image_url: Option<String>,
    /// Director or author (at most 100 characters)
    pub creator: Option<String>,
    /// Release year (at most 20 characters)
    pub release_year: Option<String>,
    /// Sequel/prequel pointer (at most 200 characters)
    pub related_work: Option<String>,
}

impl EnrichmentResult {
    /// Result carrying only the caller's own query and the attempted link.
    pub fn bare(original_query: &str, link: impl Into<String>) -> Self {
        Self {
            name: truncate_chars(original_query, NAME_CAP),
            link: link.into(),
            ..Self::default()
        }
    }

    /// Whether rich content was found.
    ///
    /// Resolution of a URL alone does not count; callers should only replace
    /// their stored item when this returns true.
    pub fn is_enriched(&self) -> bool {
        !self.summary.is_empty() || self.image_url.is_some()
    }
}

/// Cuts `value` to at most `cap` characters without splitting a code point.
pub fn truncate_chars(value: &str, cap: usize) -> String {
    match value.char_indices().nth(cap) {
        Some((byte_index, _)) => value[..byte_index].to_string(),
        None => value.to_string(),
    }
}
