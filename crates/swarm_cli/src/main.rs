//! Swarm CLI
//!
//! Command-line tools for Swarm operation streams.
//!
//! # Commands
//!
//! - `inspect` - Show the parts of address tokens
//! - `replay` - Replay an op log through an endpoint with diagnostics

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Swarm operation stream tools.
#[derive(Parser)]
#[command(name = "swarm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the parts of address tokens
    Inspect {
        /// Address tokens, e.g. /Swarm#db!A.on
        #[arg(required = true)]
        tokens: Vec<String>,
    },

    /// Replay an op log through an endpoint
    Replay {
        /// Op log, one `spec<TAB>value` line per op
        file: PathBuf,

        /// Reject out-of-order traffic
        #[arg(short, long)]
        strict: bool,

        /// Peer handshake address to write before replaying
        #[arg(short, long)]
        peer: Option<String>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect { tokens } => {
            commands::inspect::run(&tokens)?;
        }
        Commands::Replay { file, strict, peer } => {
            let summary = commands::replay::run(&file, strict, peer.as_deref())?;
            println!("{summary}");
        }
        Commands::Version => {
            println!("Swarm CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
