use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use alphaedge::config::Config;

pub mod commands;

#[derive(Parser)]
#[command(
    name = "alphaedge",
    about = "AlphaEdge data core - COT positioning ingest and live bias feed",
    version = "0.1.0"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download both weekly COT reports and refresh the persisted snapshot
    Refresh,

    /// Print the persisted COT snapshot
    Snapshot,

    /// Compute and print the live bias batch for the watchlist
    Bias,

    /// Print the 14-day momentum sentiment for one watchlist symbol
    Sentiment {
        /// Watchlist symbol (e.g. "EUR/USD", "BITCOIN")
        #[arg(short, long)]
        symbol: String,
    },
}

/// Execute CLI command with loaded configuration
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Refresh => {
            info!("Refreshing COT snapshot");
            commands::refresh(&config).await?;
        }
        Commands::Snapshot => {
            commands::snapshot(&config)?;
        }
        Commands::Bias => {
            info!("Computing bias batch");
            commands::bias(&config).await?;
        }
        Commands::Sentiment { symbol } => {
            info!("Computing momentum sentiment for {}", symbol);
            commands::sentiment(&config, &symbol).await?;
        }
    }
    Ok(())
}
