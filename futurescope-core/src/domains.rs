//! Trusted-domain table used to rank search results.

use url::Url;

use crate::types::SourceProvider;

/// Hosts known to carry good structured metadata, with their class.
pub const TRUSTED_DOMAINS: &[(&str, SourceProvider)] = &[
    ("wikipedia.org", SourceProvider::Wikipedia),
    ("imdb.com", SourceProvider::ImdbLike),
    ("themoviedb.org", SourceProvider::ImdbLike),
    ("myanimelist.net", SourceProvider::AnimeDb),
    ("kitsu.io", SourceProvider::AnimeDb),
];

/// Classifies `url` by its host. Unparseable or unknown hosts are `Generic`.
pub fn classify(url: &str) -> SourceProvider {
    let Some(host) = Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_lowercase))
    else {
        return SourceProvider::Generic;
    };

    TRUSTED_DOMAINS
        .iter()
        .find(|(domain, _)| host == *domain || host.ends_with(&format!(".{domain}")))
        .map(|(_, class)| *class)
        .unwrap_or(SourceProvider::Generic)
}

/// Whether `url` is an encyclopedia page, the only place infoboxes are read.
pub fn is_encyclopedia(url: &str) -> bool {
    classify(url) == SourceProvider::Wikipedia
}
