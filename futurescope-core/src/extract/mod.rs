//! HTML extractors run over a fetched page.
//!
//! Both are total: missing markup yields empty fields, never an error.

pub mod infobox;
pub mod metadata;

pub use infobox::extract_infobox;
pub use metadata::{MetadataExtractor, clean_title};

use scraper::ElementRef;
use scraper::node::Node;

/// Visible text of `element`, with whitespace collapsed.
///
/// Text inside `<style>`, `<script>` and citation superscripts is skipped so
/// table cells read the way they render.
pub(crate) fn visible_text(element: ElementRef<'_>) -> String {
    let root = element.id();
    let mut pieces = Vec::new();

    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .take_while(|ancestor| ancestor.id() != root)
            .any(|ancestor| is_hidden(ancestor.value()));
        if !hidden {
            pieces.extend(text.split_whitespace());
        }
    }

    pieces.join(" ")
}

fn is_hidden(node: &Node) -> bool {
    let Some(element) = node.as_element() else {
        return false;
    };
    match element.name() {
        "style" | "script" => true,
        "sup" => element.classes().any(|class| class == "reference"),
        _ => false,
    }
}
