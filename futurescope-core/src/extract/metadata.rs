//! Generic page metadata: title, description and preview image.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::types::PageMetadata;

/// Trailing site identifiers stripped from `<title>` text.
static SITE_SUFFIXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"\s+-\s+Wikipedia.*$", r"\s+-\s+IMDb.*$", r"\s+-\s+MyAnimeList\.net.*$"]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
});

/// Removes site-identifier suffixes such as `" - Wikipedia"`.
pub fn clean_title(title: &str) -> String {
    SITE_SUFFIXES
        .iter()
        .fold(title.trim().to_string(), |acc, pattern| {
            pattern.replace(&acc, "").into_owned()
        })
        .trim()
        .to_string()
}

/// Reads social-preview tags and standard markup from a document.
#[derive(Debug, Clone, Copy)]
pub struct MetadataExtractor {
    image_fallback: bool,
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl MetadataExtractor {
    /// `image_fallback` enables the inline `<img>` pass when no preview image exists.
    pub fn new(image_fallback: bool) -> Self {
        Self { image_fallback }
    }

    /// Extracts metadata, using `fallback_title` when the page has no title.
    pub fn extract(&self, document: &Html, fallback_title: &str) -> PageMetadata {
        let title = meta_content(document, "og:title")
            .or_else(|| document_title(document).map(|title| clean_title(&title)))
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| fallback_title.to_string());

        let description = meta_content(document, "og:description")
            .or_else(|| meta_content(document, "description"))
            .unwrap_or_default();

        let image_url = meta_content(document, "og:image").or_else(|| {
            if self.image_fallback {
                first_inline_image(document)
            } else {
                None
            }
        });

        PageMetadata {
            title,
            description,
            image_url,
        }
    }
}

/// Non-empty `content` of `<meta property=key>` or `<meta name=key>`.
fn meta_content(document: &Html, key: &str) -> Option<String> {
    let selector =
        Selector::parse(&format!(r#"meta[property="{key}"], meta[name="{key}"]"#)).ok()?;
    document
        .select(&selector)
        .filter_map(|meta| meta.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
}

fn document_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|title| title.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
}

/// First absolute `<img>` source that does not look like a logo or icon.
fn first_inline_image(document: &Html) -> Option<String> {
    let selector = Selector::parse("img[src]").ok()?;
    document
        .select(&selector)
        .filter_map(|img| img.value().attr("src"))
        .map(str::trim)
        .find(|src| {
            let lower = src.to_lowercase();
            (lower.starts_with("http://") || lower.starts_with("https://"))
                && !lower.contains("logo")
                && !lower.contains("icon")
        })
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> PageMetadata {
        MetadataExtractor::default().extract(&Html::parse_document(html), "fallback")
    }

    #[test]
    fn test_open_graph_wins() {
        let metadata = extract(
            r#"<html><head>
                <title>Dune (2021 film) - Wikipedia</title>
                <meta property="og:title" content="Dune: Part One">
                <meta name="description" content="plain description">
                <meta property="og:description" content="og description">
                <meta property="og:image" content="https://upload.example.org/poster.jpg">
            </head></html>"#,
        );

        assert_eq!(metadata.title, "Dune: Part One");
        assert_eq!(metadata.description, "og description");
        assert_eq!(
            metadata.image_url.as_deref(),
            Some("https://upload.example.org/poster.jpg")
        );
    }

    #[test]
    fn test_title_element_is_cleaned() {
        let metadata = extract(
            r#"<html><head><title>Dune (2021 film) - Wikipedia, the free encyclopedia</title>
               <meta name="description" content="A 2021 film."></head></html>"#,
        );

        assert_eq!(metadata.title, "Dune (2021 film)");
        assert_eq!(metadata.description, "A 2021 film.");
    }

    #[test]
    fn test_og_title_is_not_cleaned() {
        let metadata = extract(
            r#"<html><head><meta property="og:title" content="Reviews - IMDb Picks"></head></html>"#,
        );
        assert_eq!(metadata.title, "Reviews - IMDb Picks");
    }

    #[test]
    fn test_clean_title_patterns() {
        assert_eq!(clean_title("Dune (2021) - IMDb"), "Dune (2021)");
        assert_eq!(clean_title("Berserk - MyAnimeList.net"), "Berserk");
        assert_eq!(clean_title("Spider-Man - Wikipedia"), "Spider-Man");
        assert_eq!(clean_title("Plain Title"), "Plain Title");
    }

    #[test]
    fn test_missing_everything_uses_fallback() {
        let metadata = extract("<html><body><p>nothing here</p></body></html>");

        assert_eq!(metadata.title, "fallback");
        assert_eq!(metadata.description, "");
        assert_eq!(metadata.image_url, None);
    }

    #[test]
    fn test_inline_image_fallback_skips_logos_and_relative() {
        let html = r#"<html><body>
            <img src="/static/poster.jpg">
            <img src="https://cdn.example.com/site-LOGO.png">
            <img src="https://cdn.example.com/favicon.png">
            <img src="https://cdn.example.com/covers/akira.jpg">
        </body></html>"#;

        assert_eq!(
            extract(html).image_url.as_deref(),
            Some("https://cdn.example.com/covers/akira.jpg")
        );
        assert_eq!(
            MetadataExtractor::new(false)
                .extract(&Html::parse_document(html), "x")
                .image_url,
            None
        );
    }

    #[test]
    fn test_malformed_markup_is_tolerated() {
        let metadata = extract(r#"<html><head><title>Broken <meta property="og:image" content="#);
        assert!(!metadata.title.is_empty());
    }
}
