//! CalorieQuest CLI - database migrations, fixtures and store checks.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! cq-cli migrate
//!
//! # Replace all restaurants with the built-in Los Angeles fixture
//! cq-cli seed
//!
//! # Seed from a custom fixture
//! cq-cli seed --file fixtures/restaurants.yaml
//!
//! # Inspect restaurant count, location format and spatial index
//! cq-cli check
//! ```
//!
//! All commands read `API_DATABASE_URL` (or `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cq-cli")]
#[command(author, version, about = "CalorieQuest CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Replace all restaurants with fixture data
    Seed {
        /// YAML fixture file (defaults to the built-in fixture)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Report restaurant count, location format and spatial index status
    Check,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Seed { file } => commands::seed::run(file.as_deref()).await,
        Commands::Check => commands::check::run().await,
    }
}
