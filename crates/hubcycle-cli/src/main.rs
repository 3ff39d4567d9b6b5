//! hubcycle CLI - deletes surplus tags from Docker Hub repositories.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.default_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Run(args) => commands::run::run(&args).await,
        Commands::Validate(args) => commands::validate::run(&args),
        Commands::Version => {
            println!("hubcycle {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
