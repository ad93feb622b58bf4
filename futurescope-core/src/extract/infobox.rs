//! Encyclopedia infobox reader.
//!
//! Rows are scanned in document order and every matching row overwrites the
//! field it matches, so the last occurrence of a label wins.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::visible_text;
use crate::types::{CategoryKind, InfoboxFields};

static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{4}").expect("year pattern is valid"));

/// Header keywords naming the author of a written work.
pub const AUTHOR_HEADERS: &[&str] = &["author", "writer", "created by"];
/// Header keywords naming the director or creator of a screen work.
pub const DIRECTOR_HEADERS: &[&str] = &["directed by", "director", "created by"];
/// Header keywords of release and publication rows.
pub const YEAR_HEADERS: &[&str] = &["release date", "published", "publication date"];
/// Header keywords of sequel and prequel rows.
pub const RELATED_HEADERS: &[&str] = &["followed by", "preceded by", "next"];

fn header_matches(header: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| header.contains(keyword))
}

fn first_child_text(row: ElementRef<'_>, selector: &Selector) -> Option<String> {
    row.select(selector).next().map(visible_text)
}

/// Reads creator, release year and related work from `table.infobox`.
///
/// Pages without an infobox, rows without a header cell and rows without a
/// data cell all leave fields unset.
pub fn extract_infobox(document: &Html, kind: CategoryKind) -> InfoboxFields {
    let mut fields = InfoboxFields::default();

    let (Ok(table_selector), Ok(row_selector), Ok(header_selector), Ok(data_selector)) = (
        Selector::parse("table.infobox"),
        Selector::parse("tr"),
        Selector::parse("th"),
        Selector::parse("td"),
    ) else {
        return fields;
    };

    let Some(table) = document.select(&table_selector).next() else {
        return fields;
    };

    let creator_headers = match kind {
        CategoryKind::Read => AUTHOR_HEADERS,
        CategoryKind::Watch | CategoryKind::General => DIRECTOR_HEADERS,
    };

    for row in table.select(&row_selector) {
        let Some(header) = first_child_text(row, &header_selector) else {
            continue;
        };
        let header = header.trim().to_lowercase();

        let Some(cell) = first_child_text(row, &data_selector) else {
            continue;
        };

        if header_matches(&header, creator_headers) {
            fields.creator = Some(cell.clone());
        }

        if header_matches(&header, YEAR_HEADERS)
            && let Some(year) = YEAR_PATTERN.find(&cell)
        {
            fields.release_year = Some(year.as_str().to_string());
        }

        if header_matches(&header, RELATED_HEADERS) {
            fields.related_work = Some(cell);
        }
    }

    tracing::debug!("Extracted infobox fields: {fields:?}");
    fields
}
