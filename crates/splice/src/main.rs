//! Splice CLI - embed directive resolution.
//!
//! Provides commands for:
//! - `resolve`: Resolve one directive block and print the result
//! - `render`: Replace every embed block of a markdown document

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{RenderArgs, ResolveArgs};
use output::Output;

/// Splice - resolve embed directives against a note vault.
#[derive(Parser)]
#[command(name = "splice", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a directive block and print the aggregated content.
    Resolve(ResolveArgs),
    /// Replace embed blocks in a markdown document.
    Render(RenderArgs),
}

/// Initialize tracing.
///
/// `--verbose` enables DEBUG level, otherwise use `RUST_LOG` or the filter
/// from the config file.
pub(crate) fn init_tracing(verbose: bool, config_filter: &str) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_filter))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let result = match cli.command {
        Commands::Resolve(args) => args.execute(),
        Commands::Render(args) => args.execute(&output),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
