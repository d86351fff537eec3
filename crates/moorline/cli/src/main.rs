//! Moorline CLI - drive documents through the anchoring lifecycle
//!
//! The `run` command takes a document (a built-in demo invoice or a rows
//! file) through the full lifecycle: create, authorize the collaborator,
//! attach the compute rule, anchor, collect the compute result, and mint an
//! NFT. `template` prepares a reusable committed template the lifecycle can
//! clone from.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod routing;
mod rows;

use config::MoorlineConfig;
use error::CliResult;

/// Moorline CLI application
#[derive(Parser)]
#[command(name = "moorline")]
#[command(about = "Moorline - document anchoring lifecycle client", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "MOORLINE_CONFIG")]
    config: Option<String>,

    /// Anchoring node URL (overrides configuration)
    #[arg(long, env = "MOORLINE_NODE_URL")]
    node_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Run the document lifecycle end to end
    Run {
        /// Comma-separated invoice rows file; one document per row
        #[arg(long)]
        rows: Option<PathBuf>,

        /// Skip the first line of the rows file
        #[arg(long)]
        has_header: bool,
    },

    /// Create and anchor a reusable template document
    Template,

    /// Show effective configuration
    Config,
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    // Load and validate config
    let mut config = MoorlineConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.node_url {
        config.node.url = url;
    }
    if !matches!(cli.command, Commands::Config) {
        config.validate()?;
    }

    match cli.command {
        Commands::Run { rows, has_header } => {
            commands::run(&config, rows.as_deref(), has_header).await
        }
        Commands::Template => commands::template(&config).await,
        Commands::Config => commands::show_config(&config),
    }
}
