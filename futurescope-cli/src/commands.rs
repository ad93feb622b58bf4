//! CLI command implementations

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Args, Subcommand};
use futurescope_core::{
    CategoryKind, EnrichmentRequest, EnrichmentResult, FuturescopeConfig, MemorySink,
    MetadataResolver, QueryNormalizer, TracingSink,
};

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a title (or URL) to metadata
    Enrich {
        #[command(flatten)]
        target: TargetArgs,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        /// Print the diagnostic trail after the result
        #[arg(long)]
        trace: bool,
        /// Timeout in seconds for every network operation
        #[arg(long)]
        timeout: Option<u64>,
        /// Search results scanned per provider
        #[arg(long)]
        max_results: Option<usize>,
        /// Do not fall back to inline images when no preview image exists
        #[arg(long)]
        no_image_fallback: bool,
    },
    /// Show the search query a title would produce, without network access
    Normalize {
        #[command(flatten)]
        target: TargetArgs,
    },
}

/// The title and the list it belongs to
#[derive(Args)]
pub struct TargetArgs {
    /// Title, or a URL to read directly
    query: String,
    /// List kind
    #[arg(short, long, value_enum, ignore_case = true, default_value_t = CategoryKind::General)]
    kind: CategoryKind,
    /// List name, e.g. "Anime" or "Manga shelf"
    #[arg(short, long, default_value = "")]
    label: String,
}

impl TargetArgs {
    fn into_request(self) -> anyhow::Result<EnrichmentRequest> {
        let request = EnrichmentRequest::new(self.query, self.kind, self.label);
        if request.raw_query.is_empty() {
            bail!("query must not be empty");
        }
        Ok(request)
    }
}

/// Handle the CLI command
///
/// # Errors
/// Returns an error for invalid arguments or when output cannot be written
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Enrich {
            target,
            json,
            trace,
            timeout,
            max_results,
            no_image_fallback,
        } => {
            let mut config = FuturescopeConfig::from_env();
            if let Some(seconds) = timeout {
                config = config.with_uniform_timeout(Duration::from_secs(seconds));
            }
            if let Some(count) = max_results.filter(|count| *count > 0) {
                config.search.max_results = count;
            }
            if no_image_fallback {
                config.extraction.image_fallback = false;
            }
            enrich(target.into_request()?, config, json, trace).await
        }
        Commands::Normalize { target } => normalize(target.into_request()?),
    }
}

/// Run the pipeline and print the result
///
/// # Errors
/// - HTTP client construction failed
/// - JSON serialization failed
pub async fn enrich(
    request: EnrichmentRequest,
    config: FuturescopeConfig,
    json: bool,
    trace: bool,
) -> anyhow::Result<()> {
    let sink = Arc::new(MemorySink::forwarding_to(Arc::new(TracingSink)));
    let resolver = MetadataResolver::new(config)
        .context("Failed to set up resolver")?
        .with_sink(sink.clone());

    let result = resolver.enrich(&request).await;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialize result")?
        );
    } else {
        print_result(&request, &result);
    }

    if trace {
        eprintln!("Diagnostics:");
        for event in sink.take() {
            eprintln!("  {event}");
        }
    }

    Ok(())
}

fn print_result(request: &EnrichmentRequest, result: &EnrichmentResult) {
    if !result.is_enriched() {
        println!("Could not find details for {}", result.name);
        if !result.link.is_empty() {
            println!("  Tried: {}", result.link);
        }
        return;
    }

    println!("{}", result.name);
    println!("  Link:    {}", result.link);
    if let Some(image) = &result.image_url {
        println!("  Image:   {image}");
    }
    if let Some(creator) = &result.creator {
        let label = match request.category_kind {
            CategoryKind::Read => "Author: ",
            _ => "Creator:",
        };
        println!("  {label} {creator}");
    }
    if let Some(year) = &result.release_year {
        println!("  Year:    {year}");
    }
    if let Some(related) = &result.related_work {
        println!("  Related: {related}");
    }
    if !result.summary.is_empty() {
        println!();
        println!("{}", result.summary);
    }
    println!();
    println!("Status for new items: {}", request.category_kind.default_status());
}

/// Print the normalized search query
///
/// # Errors
/// Never fails; returns `Result` for symmetry with the other commands
pub fn normalize(request: EnrichmentRequest) -> anyhow::Result<()> {
    let sink = MemorySink::new();
    let resolved = QueryNormalizer::default().normalize(&request, &sink);

    match resolved.direct_target {
        Some(url) => println!("direct: {url}"),
        None => println!("search: {}", resolved.search_query),
    }

    Ok(())
}
