//! End-to-end scenarios from request to result.

use std::sync::Arc;
use std::time::Duration;

use futurescope_core::http::HttpResponse;
use futurescope_core::providers::ScriptedProvider;
use futurescope_core::providers::scripted::StaticHttpClient;
use futurescope_core::{
    CategoryKind, Diagnostic, EnrichmentRequest, EnrichmentResult, MemorySink,
};

use crate::fixtures::{DUNE_FILM_PAGE, DUNE_FILM_URL, resolver};

#[tokio::test]
async fn test_dune_watch_movies_resolves_infobox() {
    let primary = Arc::new(ScriptedProvider::returning(
        "duckduckgo",
        &["https://www.imdb.com/title/tt1160419/", DUNE_FILM_URL],
    ));
    let secondary = Arc::new(ScriptedProvider::returning("google", &[]));
    let http = Arc::new(StaticHttpClient::new());
    http.page(DUNE_FILM_URL, DUNE_FILM_PAGE);

    let result = resolver(primary.clone(), secondary.clone(), http.clone())
        .enrich(&EnrichmentRequest::new("Dune", CategoryKind::Watch, "Movies"))
        .await;

    assert_eq!(primary.queries(), vec!["Dune film movie"]);
    assert_eq!(secondary.calls(), 0);
    assert_eq!(http.requests(), vec![DUNE_FILM_URL]);

    assert_eq!(result.name, "Dune (2021 film)");
    assert_eq!(result.link, DUNE_FILM_URL);
    assert_eq!(result.creator.as_deref(), Some("Denis Villeneuve"));
    assert_eq!(result.release_year.as_deref(), Some("2021"));
    assert_eq!(result.related_work.as_deref(), Some("Dune: Part Two"));
    assert!(result.summary.starts_with("Dune is a 2021 American"));
    assert!(result.is_enriched());
}

#[tokio::test]
async fn test_direct_url_is_sole_fetch_target() {
    let primary = Arc::new(ScriptedProvider::returning("duckduckgo", &[DUNE_FILM_URL]));
    let secondary = Arc::new(ScriptedProvider::returning("google", &[DUNE_FILM_URL]));
    let http = Arc::new(StaticHttpClient::new());
    http.page(
        "https://example.com/page",
        r#"<html><head><title>Example Page</title>
           <meta property="og:image" content="https://example.com/cover.png"></head></html>"#,
    );

    let result = resolver(primary.clone(), secondary.clone(), http.clone())
        .enrich(&EnrichmentRequest::new(
            "https://example.com/page",
            CategoryKind::General,
            "",
        ))
        .await;

    assert_eq!(primary.calls() + secondary.calls(), 0);
    assert_eq!(http.requests(), vec!["https://example.com/page"]);
    assert_eq!(result.name, "Example Page");
    assert_eq!(result.link, "https://example.com/page");
}

#[tokio::test]
async fn test_total_failure_is_a_plain_result() {
    let primary = Arc::new(ScriptedProvider::failing("duckduckgo", "HTTP 429"));
    let secondary = Arc::new(ScriptedProvider::failing("google", "captcha"));
    let http = Arc::new(StaticHttpClient::new());
    http.respond(
        "https://en.wikipedia.org/wiki/Nonexistent_Title_Qq",
        HttpResponse::new(404, "Wikipedia does not have an article with this exact name."),
    );
    let sink = MemorySink::new();

    let result = resolver(primary, secondary, http)
        .enrich_with_sink(
            &EnrichmentRequest::new("nonexistent title qq", CategoryKind::Read, "Books"),
            &sink,
        )
        .await;

    assert_eq!(
        result,
        EnrichmentResult {
            name: "nonexistent title qq".to_string(),
            summary: String::new(),
            link: String::new(),
            image_url: None,
            creator: None,
            release_year: None,
            related_work: None,
        }
    );

    let events = sink.events();
    assert!(events.contains(&Diagnostic::GuessProbed {
        url: "https://en.wikipedia.org/wiki/Nonexistent_Title_Qq".to_string(),
        accepted: false,
    }));
    assert!(events.contains(&Diagnostic::NoUrlResolved));
}

#[tokio::test]
async fn test_fetch_failure_records_attempted_link() {
    let primary = Arc::new(ScriptedProvider::returning(
        "duckduckgo",
        &["https://www.goodreads.com/book/show/234225.Dune"],
    ));
    let secondary = Arc::new(ScriptedProvider::returning("google", &[]));
    // No page registered: the fetch fails at the transport level.
    let http = Arc::new(StaticHttpClient::new());

    let result = resolver(primary, secondary, http)
        .enrich(&EnrichmentRequest::new("Dune", CategoryKind::Read, "Sci-fi"))
        .await;

    assert_eq!(result.name, "Dune");
    assert_eq!(result.link, "https://www.goodreads.com/book/show/234225.Dune");
    assert_eq!(result.summary, "");
    assert_eq!(result.image_url, None);
    assert_eq!(result.creator, None);
    assert!(!result.is_enriched());
}

#[tokio::test]
async fn test_stalled_page_fetch_keeps_attempted_link() {
    let primary = Arc::new(ScriptedProvider::returning("duckduckgo", &[DUNE_FILM_URL]));
    let secondary = Arc::new(ScriptedProvider::returning("google", &[]));
    let http = Arc::new(StaticHttpClient::new());
    http.stall(DUNE_FILM_URL);
    let sink = MemorySink::new();

    let request = EnrichmentRequest::new("Dune", CategoryKind::Watch, "Movies");
    let resolver = resolver(primary, secondary, http);
    let result = tokio::time::timeout(
        Duration::from_secs(3),
        resolver.enrich_with_sink(&request, &sink),
    )
    .await
    .expect("enrich returns after the fetch deadline");

    assert_eq!(result, EnrichmentResult::bare("Dune", DUNE_FILM_URL));
    assert!(sink.events().iter().any(|event| matches!(
        event,
        Diagnostic::FetchFailed { url, .. } if url == DUNE_FILM_URL
    )));
}

#[tokio::test]
async fn test_page_without_rich_content_keeps_original_name() {
    let url = "https://forum.example.com/thread/42";
    let primary = Arc::new(ScriptedProvider::returning("duckduckgo", &[url]));
    let secondary = Arc::new(ScriptedProvider::returning("google", &[]));
    let http = Arc::new(StaticHttpClient::new());
    http.page(url, "<html><head><title>Forum thread #42</title></head><body></body></html>");

    let result = resolver(primary, secondary, http)
        .enrich(&EnrichmentRequest::new("Akira", CategoryKind::Watch, "Anime"))
        .await;

    assert_eq!(result.name, "Akira");
    assert_eq!(result.link, url);
    assert!(!result.is_enriched());
}

#[tokio::test]
async fn test_oversized_fields_are_capped() {
    let url = "https://en.wikipedia.org/wiki/Long";
    let long_title = "T".repeat(400);
    let long_description = "d".repeat(2_000);
    let long_creator = "c".repeat(400);
    let long_related = "r".repeat(900);
    let page = format!(
        r#"<html><head>
           <meta property="og:title" content="{long_title}">
           <meta property="og:description" content="{long_description}">
           </head><body><table class="infobox">
           <tr><th>Author</th><td>{long_creator}</td></tr>
           <tr><th>Followed by</th><td>{long_related}</td></tr>
           </table></body></html>"#
    );
    let primary = Arc::new(ScriptedProvider::returning("duckduckgo", &[url]));
    let secondary = Arc::new(ScriptedProvider::returning("google", &[]));
    let http = Arc::new(StaticHttpClient::new());
    http.page(url, &page);

    let result = resolver(primary, secondary, http)
        .enrich(&EnrichmentRequest::new("Long", CategoryKind::Read, "Books"))
        .await;

    assert_eq!(result.name.chars().count(), 100);
    assert_eq!(result.summary.chars().count(), 500);
    assert_eq!(result.creator.map(|c| c.chars().count()), Some(100));
    assert_eq!(result.related_work.map(|r| r.chars().count()), Some(200));
}

#[tokio::test]
async fn test_result_serializes_for_callers() {
    let primary = Arc::new(ScriptedProvider::returning("duckduckgo", &[DUNE_FILM_URL]));
    let secondary = Arc::new(ScriptedProvider::returning("google", &[]));
    let http = Arc::new(StaticHttpClient::new());
    http.page(DUNE_FILM_URL, DUNE_FILM_PAGE);

    let result = resolver(primary, secondary, http)
        .enrich(&EnrichmentRequest::new("Dune", CategoryKind::Watch, "Movies"))
        .await;

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["creator"], "Denis Villeneuve");
    assert_eq!(value["release_year"], "2021");

    let decoded: EnrichmentResult = serde_json::from_value(value).unwrap();
    assert_eq!(decoded, result);
}
