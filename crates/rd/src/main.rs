//! RD CLI - Documentation site over a GitHub content repository.
//!
//! Provides commands for:
//! - `serve`: Start the documentation API server
//! - `pages`: Print the page listing
//! - `tree`: Print the navigation tree
//! - `search-index`: Export search records for the search-index sync job

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{PagesArgs, SearchIndexArgs, ServeArgs, TreeArgs};
use error::CliError;
use output::Output;

/// Application version from Cargo.toml.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// RD - Documentation site over a GitHub content repository.
#[derive(Parser)]
#[command(name = "rd", version, about)]
struct Cli {
    /// Enable verbose output (info-level logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the documentation API server.
    Serve(ServeArgs),
    /// Print the page listing.
    Pages(PagesArgs),
    /// Print the navigation tree.
    Tree(TreeArgs),
    /// Write search records as JSON.
    SearchIndex(SearchIndexArgs),
}

impl Commands {
    async fn execute(self) -> Result<(), CliError> {
        match self {
            Self::Serve(args) => args.execute(VERSION).await,
            Self::Pages(args) => args.execute().await,
            Self::Tree(args) => args.execute().await,
            Self::SearchIndex(args) => args.execute().await,
        }
    }
}

/// Log filter: `--verbose` enables INFO, otherwise `RUST_LOG` or WARN.
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    if cli.verbose {
        output.highlight(&format!("rd {VERSION}"));
    }

    let result = tokio::runtime::Runtime::new()
        .map_err(CliError::from)
        .and_then(|rt| rt.block_on(cli.command.execute()));

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
