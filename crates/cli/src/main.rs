//! ShoppyGlobe CLI - Database migrations and development tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! shoppy-cli migrate
//!
//! # Load catalog products from YAML
//! shoppy-cli seed products crates/cli/seed/products.yaml
//!
//! # Validate a seed file without touching the database
//! shoppy-cli seed products crates/cli/seed/products.yaml --dry-run
//!
//! # Mint a bearer token for user 1
//! shoppy-cli token issue --user-id 1
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shoppy-cli")]
#[command(author, version, about = "ShoppyGlobe CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Bearer token tools
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert catalog products from a YAML file
    Products {
        /// Path to the YAML file
        file: String,

        /// Validate only, using an in-memory catalog
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Issue a token signed with `STOREFRONT_JWT_SECRET`
    Issue {
        /// User ID to put in the `sub` claim
        #[arg(short, long)]
        user_id: i32,

        /// Token lifetime in seconds
        #[arg(long, default_value_t = 3600)]
        ttl_secs: u64,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Products { file, dry_run } => {
                commands::seed::products(&file, dry_run).await?;
            }
        },
        Commands::Token { action } => match action {
            TokenAction::Issue { user_id, ttl_secs } => {
                commands::token::issue(user_id, ttl_secs)?;
            }
        },
    }
    Ok(())
}
