//! Shared fixtures: canned pages and resolver wiring.

use std::sync::Arc;
use std::time::Duration;

use futurescope_core::providers::ScriptedProvider;
use futurescope_core::providers::scripted::StaticHttpClient;
use futurescope_core::{CascadeStep, FuturescopeConfig, MetadataResolver, SelectionPolicy};

pub const DUNE_FILM_URL: &str = "https://en.wikipedia.org/wiki/Dune_(2021_film)";

pub const DUNE_FILM_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en"><head>
<meta charset="UTF-8">
<title>Dune (2021 film) - Wikipedia</title>
<meta property="og:image" content="https://upload.wikimedia.org/wikipedia/en/8/8e/Dune_%282021_film%29.jpg">
<meta name="description" content="Dune is a 2021 American epic science fiction film directed by Denis Villeneuve.">
</head><body>
<table class="infobox vevent"><tbody>
<tr><th colspan="2" class="infobox-above summary">Dune</th></tr>
<tr><td colspan="2" class="infobox-image"><img src="//upload.wikimedia.org/poster.jpg"></td></tr>
<tr><th scope="row" class="infobox-label">Directed by</th><td class="infobox-data">Denis Villeneuve</td></tr>
<tr><th scope="row" class="infobox-label">Release date</th><td class="infobox-data">October 22, 2021<sup class="reference">[1]</sup></td></tr>
<tr><th scope="row" class="infobox-label">Followed by</th><td class="infobox-data"><i>Dune: Part Two</i></td></tr>
</tbody></table>
</body></html>"#;

/// Config with short deadlines so hanging fakes do not slow the suite.
pub fn test_config() -> FuturescopeConfig {
    FuturescopeConfig::default().with_uniform_timeout(Duration::from_millis(300))
}

/// Resolver over a primary and a secondary scripted provider.
pub fn resolver(
    primary: Arc<ScriptedProvider>,
    secondary: Arc<ScriptedProvider>,
    http: Arc<StaticHttpClient>,
) -> MetadataResolver {
    MetadataResolver::from_parts(
        &test_config(),
        http,
        vec![
            CascadeStep::new(primary, SelectionPolicy::PreferEncyclopedia),
            CascadeStep::new(secondary, SelectionPolicy::FirstTrusted),
        ],
    )
}
