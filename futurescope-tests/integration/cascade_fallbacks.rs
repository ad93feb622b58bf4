//! Provider cascade behaviour seen through the full pipeline.

use std::sync::Arc;
use std::time::Duration;

use futurescope_core::providers::ScriptedProvider;
use futurescope_core::providers::scripted::StaticHttpClient;
use futurescope_core::{CategoryKind, Diagnostic, EnrichmentRequest, MemorySink, SourceProvider};

use crate::fixtures::{DUNE_FILM_PAGE, DUNE_FILM_URL, resolver};

#[tokio::test]
async fn test_hanging_primary_does_not_block_secondary() {
    let primary = Arc::new(ScriptedProvider::hanging("duckduckgo"));
    let secondary = Arc::new(ScriptedProvider::returning(
        "google",
        &["https://blog.example.com/dune-review", DUNE_FILM_URL],
    ));
    let http = Arc::new(StaticHttpClient::new());
    http.page(DUNE_FILM_URL, DUNE_FILM_PAGE);
    let sink = MemorySink::new();

    let result = resolver(primary, secondary.clone(), http)
        .enrich_with_sink(
            &EnrichmentRequest::new("Dune", CategoryKind::Watch, "Movies"),
            &sink,
        )
        .await;

    assert_eq!(secondary.calls(), 1);
    assert_eq!(result.link, DUNE_FILM_URL);
    assert!(sink.events().iter().any(|event| matches!(
        event,
        Diagnostic::ProviderFailed { provider, reason } if provider == "duckduckgo" && reason.contains("timed out")
    )));
}

#[tokio::test]
async fn test_empty_primary_then_secondary_first_result() {
    let primary = Arc::new(ScriptedProvider::returning("duckduckgo", &[]));
    let secondary = Arc::new(ScriptedProvider::returning(
        "google",
        &["https://a.example.com/", "https://b.example.com/"],
    ));
    let http = Arc::new(StaticHttpClient::new());
    http.page(
        "https://a.example.com/",
        r#"<html><head><meta name="description" content="first"></head></html>"#,
    );
    let sink = MemorySink::new();

    let result = resolver(primary, secondary, http)
        .enrich_with_sink(
            &EnrichmentRequest::new("Obscure Zine", CategoryKind::Read, "Comics"),
            &sink,
        )
        .await;

    assert_eq!(result.link, "https://a.example.com/");
    assert_eq!(result.summary, "first");
    assert!(sink.events().contains(&Diagnostic::ProviderEmpty {
        provider: "duckduckgo".to_string()
    }));
}

#[tokio::test]
async fn test_guess_reached_after_both_providers_fail() {
    let guess = "https://en.wikipedia.org/wiki/Spirited_Away";
    let primary = Arc::new(ScriptedProvider::failing("duckduckgo", "blocked"));
    let secondary = Arc::new(ScriptedProvider::failing("google", "blocked"));
    let http = Arc::new(StaticHttpClient::new());
    http.page(
        guess,
        r#"<html><head><title>Spirited Away - Wikipedia</title>
           <meta property="og:description" content="A 2001 Japanese animated fantasy film."></head>
           <body><table class="infobox"><tr><th>Directed by</th><td>Hayao Miyazaki</td></tr></table></body></html>"#,
    );
    let sink = MemorySink::new();

    let result = resolver(primary.clone(), secondary, http.clone())
        .enrich_with_sink(
            &EnrichmentRequest::new("spirited away", CategoryKind::Watch, "Anime"),
            &sink,
        )
        .await;

    // Search saw the augmented query; the guess used the original one.
    assert_eq!(primary.queries(), vec!["spirited away anime"]);
    // The probe's body is reused rather than downloaded twice.
    assert_eq!(http.requests(), vec![guess]);
    assert_eq!(result.name, "Spirited Away");
    assert_eq!(result.creator.as_deref(), Some("Hayao Miyazaki"));
    assert!(sink.events().contains(&Diagnostic::CandidateSelected {
        url: guess.to_string(),
        source: SourceProvider::Guess,
    }));
}

#[tokio::test]
async fn test_database_backup_used_when_no_encyclopedia_hit() {
    let mal = "https://myanimelist.net/manga/2/Berserk";
    let primary = Arc::new(ScriptedProvider::returning(
        "duckduckgo",
        &["https://fan.example.com/berserk", mal, "https://shop.example.com/berserk"],
    ));
    let secondary = Arc::new(ScriptedProvider::returning("google", &[]));
    let http = Arc::new(StaticHttpClient::new());
    http.page(
        mal,
        r#"<html><head><title>Berserk | Manga - MyAnimeList.net</title>
           <meta property="og:image" content="https://cdn.myanimelist.net/images/manga/1/157897.jpg">
           </head></html>"#,
    );

    let result = resolver(primary.clone(), secondary, http)
        .enrich(&EnrichmentRequest::new("Berserk", CategoryKind::Read, "Manga"))
        .await;

    assert_eq!(primary.queries(), vec!["Berserk manga"]);
    assert_eq!(result.link, mal);
    assert_eq!(result.name, "Berserk | Manga");
    assert_eq!(result.creator, None);
}

#[tokio::test]
async fn test_stalled_guess_probe_ends_unresolved() {
    let guess = "https://en.wikipedia.org/wiki/Spider-Man";
    let primary = Arc::new(ScriptedProvider::failing("duckduckgo", "blocked"));
    let secondary = Arc::new(ScriptedProvider::returning("google", &[]));
    let http = Arc::new(StaticHttpClient::new());
    http.stall(guess);
    let sink = MemorySink::new();

    let request = EnrichmentRequest::new("spider-man", CategoryKind::Read, "Comics");
    let resolver = resolver(primary, secondary, http.clone());
    let result = tokio::time::timeout(
        Duration::from_secs(3),
        resolver.enrich_with_sink(&request, &sink),
    )
    .await
    .expect("enrich returns after the probe deadline");

    assert_eq!(http.requests(), vec![guess]);
    assert_eq!(result.name, "spider-man");
    assert_eq!(result.link, "");
    assert!(sink.events().contains(&Diagnostic::GuessProbed {
        url: guess.to_string(),
        accepted: false,
    }));
    assert_eq!(
        sink.events().last(),
        Some(&Diagnostic::Assembled {
            name: "spider-man".to_string(),
            enriched: false,
        })
    );
}
