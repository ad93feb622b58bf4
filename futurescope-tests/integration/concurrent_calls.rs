//! Repeated and parallel calls on one resolver.

use std::sync::Arc;

use futurescope_core::providers::ScriptedProvider;
use futurescope_core::providers::scripted::StaticHttpClient;
use futurescope_core::{CategoryKind, EnrichmentRequest};

use crate::fixtures::{DUNE_FILM_PAGE, DUNE_FILM_URL, resolver};

#[tokio::test]
async fn test_identical_requests_give_identical_results() {
    let primary = Arc::new(ScriptedProvider::returning("duckduckgo", &[DUNE_FILM_URL]));
    let secondary = Arc::new(ScriptedProvider::returning("google", &[]));
    let http = Arc::new(StaticHttpClient::new());
    http.page(DUNE_FILM_URL, DUNE_FILM_PAGE);
    let resolver = resolver(primary, secondary, http);
    let request = EnrichmentRequest::new("Dune", CategoryKind::Watch, "Movies");

    let first = resolver.enrich(&request).await;
    let second = resolver.enrich(&request).await;

    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
}

#[tokio::test]
async fn test_parallel_calls_do_not_interfere() {
    let primary = Arc::new(ScriptedProvider::returning("duckduckgo", &[DUNE_FILM_URL]));
    let secondary = Arc::new(ScriptedProvider::returning("google", &[]));
    let http = Arc::new(StaticHttpClient::new());
    http.page(DUNE_FILM_URL, DUNE_FILM_PAGE);
    let resolver = Arc::new(resolver(primary.clone(), secondary, http));

    let calls = (0..8).map(|_| {
        let resolver = resolver.clone();
        tokio::spawn(async move {
            resolver
                .enrich(&EnrichmentRequest::new("Dune", CategoryKind::Watch, "Movies"))
                .await
        })
    });

    let results: Vec<_> = futures::future::join_all(calls)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(primary.calls(), 8);
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(results[0].creator.as_deref(), Some("Denis Villeneuve"));
}
