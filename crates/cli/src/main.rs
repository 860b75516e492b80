//! Lumina CLI - database migrations and catalog management.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations (and create the session table)
//! lumina-cli migrate
//!
//! # Load a catalog, replacing what is there
//! lumina-cli seed catalog catalog.yaml --clear
//!
//! # Show row counts
//! lumina-cli seed stats
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed catalog` - Load categories, products and order fixtures from YAML
//! - `seed stats` - Show catalog and shopper counts

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lumina-cli")]
#[command(author, version, about = "Lumina CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Seed the storefront database
    Seed {
        #[command(subcommand)]
        action: SeedAction,
    },
}

#[derive(Subcommand)]
enum SeedAction {
    /// Load a catalog YAML file
    Catalog {
        /// Path to the YAML file
        file: String,

        /// Delete existing products and categories first
        #[arg(long)]
        clear: bool,
    },
    /// Show row counts
    Stats,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { action } => match action {
            SeedAction::Catalog { file, clear } => commands::seed::catalog(&file, clear).await?,
            SeedAction::Stats => commands::seed::stats().await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
