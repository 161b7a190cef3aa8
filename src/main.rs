//! trimx-batch
//!
//! Trims a fixed amount from the start and end of every video in a batch.
//!
//! # Usage
//!
//! ```bash
//! trimx-batch trim a.mp4 b.mov --start-cut 1 --end-cut 2 --name intro --archive
//! trimx-batch probe a.mp4
//! trimx-batch archive --session <ID>
//! trimx-batch cleanup --session <ID>
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

use trimx_batch::cli::{commands, Cli, Commands};
use trimx_batch::utils::init_logging;
use trimx_batch::{AppConfig, DefaultAppContainer};

/// Main entry point for the trimx-batch CLI
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref(), &cli.overrides())?;
    init_logging(&config.log_level, config.log_json);
    info!(
        storage_root = %config.storage_root.display(),
        policy = %config.policy,
        "Starting trimx-batch"
    );

    let container = DefaultAppContainer::new(&config);

    match cli.command {
        Commands::Trim(args) => commands::trim(&container, args).await,
        Commands::Probe(args) => commands::probe(&container, args).await,
        Commands::Archive(args) => commands::archive(&container, args).await,
        Commands::Cleanup(args) => commands::cleanup(&container, args).await,
    }
}
