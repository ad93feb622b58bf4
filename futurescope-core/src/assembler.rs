//! Merges extractor output into the caller-facing record.

use crate::observe::{Diagnostic, DiagnosticSink};
use crate::types::{
    CREATOR_CAP, EnrichmentResult, InfoboxFields, NAME_CAP, PageMetadata, RELATED_WORK_CAP,
    RELEASE_YEAR_CAP, SUMMARY_CAP, truncate_chars,
};

fn capped(value: Option<String>, cap: usize) -> Option<String> {
    value
        .map(|v| truncate_chars(v.trim(), cap))
        .filter(|v| !v.is_empty())
}

/// Builds terminal results; the single place failures stop propagating.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResultAssembler;

impl ResultAssembler {
    /// Result for a successfully fetched and parsed page.
    ///
    /// The page title only replaces `original_query` when a summary or image
    /// was found.
    pub fn assemble(
        &self,
        original_query: &str,
        link: &str,
        metadata: PageMetadata,
        infobox: InfoboxFields,
        sink: &dyn DiagnosticSink,
    ) -> EnrichmentResult {
        let summary = truncate_chars(metadata.description.trim(), SUMMARY_CAP);
        let image_url = metadata
            .image_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let enriched = !summary.is_empty() || image_url.is_some();
        let title = metadata.title.trim();
        let name = if enriched && !title.is_empty() {
            truncate_chars(title, NAME_CAP)
        } else {
            truncate_chars(original_query, NAME_CAP)
        };

        let result = EnrichmentResult {
            name,
            summary,
            link: link.to_string(),
            image_url,
            creator: capped(infobox.creator, CREATOR_CAP),
            release_year: capped(infobox.release_year, RELEASE_YEAR_CAP),
            related_work: capped(infobox.related_work, RELATED_WORK_CAP),
        };

        self.finish(result, sink)
    }

    /// Result when the page at `link` could not be retrieved.
    pub fn fetch_failed(
        &self,
        original_query: &str,
        link: &str,
        sink: &dyn DiagnosticSink,
    ) -> EnrichmentResult {
        self.finish(EnrichmentResult::bare(original_query, link), sink)
    }

    /// Result when no URL was resolved at all.
    pub fn unresolved(&self, original_query: &str, sink: &dyn DiagnosticSink) -> EnrichmentResult {
        self.finish(EnrichmentResult::bare(original_query, ""), sink)
    }

    fn finish(&self, result: EnrichmentResult, sink: &dyn DiagnosticSink) -> EnrichmentResult {
        sink.record(&Diagnostic::Assembled {
            name: result.name.clone(),
            enriched: result.is_enriched(),
        });
        result
    }
}
