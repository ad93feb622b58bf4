//! Futurescope CLI - Command-line interface
//!
//! Resolves titles to metadata from the terminal.

mod commands;

use clap::Parser;
use futurescope_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "futurescope")]
#[command(about = "Look up metadata for books, films and shows")]
struct Cli {
    /// Console log level (RUST_LOG overrides)
    #[arg(long, global = true, default_value = "warn")]
    log_level: CliLogLevel,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_tracing_level())?;

    commands::handle_command(cli.command).await
}
