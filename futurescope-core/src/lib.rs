//! Futurescope Core - title-to-metadata resolution
//!
//! Given a free-text title and the list it belongs to, finds a canonical web
//! page through a cascade of search providers and extracts display name,
//! description, cover image and encyclopedia infobox fields from it. Every
//! call returns an [`EnrichmentResult`], however much of the pipeline fails.

pub mod assembler;
pub mod cascade;
pub mod config;
pub mod domains;
pub mod errors;
pub mod extract;
pub mod fetcher;
pub mod http;
pub mod observe;
pub mod pipeline;
pub mod providers;
pub mod query;
pub mod tracing_setup;
pub mod types;

// Re-export main types for convenient access
pub use cascade::{CascadeStep, ProviderCascade, Resolution, SelectionPolicy};
pub use config::FuturescopeConfig;
pub use errors::EnrichmentError;
pub use observe::{Diagnostic, DiagnosticSink, MemorySink, TracingSink};
pub use pipeline::MetadataResolver;
pub use providers::{SearchHit, SearchProvider};
pub use query::QueryNormalizer;
pub use types::{
    CandidateUrl, CategoryKind, EnrichmentRequest, EnrichmentResult, InfoboxFields,
    ResolvedQuery, SourceProvider,
};

/// Convenience type alias for Results with EnrichmentError.
pub type Result<T> = std::result::Result<T, EnrichmentError>;
