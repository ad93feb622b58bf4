//! Deterministic stand-ins for search providers and HTTP, for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{SearchHit, SearchProvider};
use crate::errors::EnrichmentError;
use crate::http::{HttpClient, HttpResponse};

#[derive(Debug, Clone)]
enum Script {
    Hits(Vec<SearchHit>),
    Fail(String),
    Hang,
}

/// Search provider returning a fixed answer.
#[derive(Debug)]
pub struct ScriptedProvider {
    name: String,
    script: Script,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn with_script(name: &str, script: Script) -> Self {
        Self {
            name: name.to_string(),
            script,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Returns these URLs in order.
    pub fn returning(name: &str, urls: &[&str]) -> Self {
        let hits = urls
            .iter()
            .map(|url| SearchHit::new(*url, String::new()))
            .collect();
        Self::with_script(name, Script::Hits(hits))
    }

    /// Fails every call with a provider error.
    pub fn failing(name: &str, reason: &str) -> Self {
        Self::with_script(name, Script::Fail(reason.to_string()))
    }

    /// Never answers; only useful under a timeout.
    pub fn hanging(name: &str) -> Self {
        Self::with_script(name, Script::Hang)
    }

    /// Number of searches performed.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Queries received, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl SearchProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, EnrichmentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().push(query.to_string());

        match &self.script {
            Script::Hits(hits) => Ok(hits.iter().take(max_results).cloned().collect()),
            Script::Fail(reason) => Err(EnrichmentError::ProviderError {
                provider: self.name.clone(),
                reason: reason.clone(),
            }),
            Script::Hang => {
                std::future::pending::<()>().await;
                Ok(Vec::new())
            }
        }
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Answer(HttpResponse),
    Stall,
}

/// HTTP client answering from a URL → response table.
///
/// Unknown URLs fail as a transport error.
#[derive(Debug, Default)]
pub struct StaticHttpClient {
    replies: Mutex<HashMap<String, Reply>>,
    requests: Mutex<Vec<String>>,
}

impl StaticHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the response for `url`.
    pub fn respond(&self, url: &str, response: HttpResponse) {
        self.replies
            .lock()
            .insert(url.to_string(), Reply::Answer(response));
    }

    /// Registers a 200 response with `body`.
    pub fn page(&self, url: &str, body: &str) {
        self.respond(url, HttpResponse::new(200, body));
    }

    /// Makes requests for `url` never complete, ignoring the timeout hint.
    pub fn stall(&self, url: &str) {
        self.replies.lock().insert(url.to_string(), Reply::Stall);
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl HttpClient for StaticHttpClient {
    async fn get(&self, url: &str, _timeout: Duration) -> Result<HttpResponse, EnrichmentError> {
        self.requests.lock().push(url.to_string());
        let reply = self.replies.lock().get(url).cloned();

        match reply {
            Some(Reply::Answer(response)) => Ok(response),
            Some(Reply::Stall) => std::future::pending().await,
            None => Err(EnrichmentError::FetchError {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}
