//! StyleFinder CLI - catalog inspection and seeding tools.
//!
//! # Usage
//!
//! ```bash
//! # List the catalog, optionally one category
//! sf-cli catalog list --category women
//!
//! # Show one item
//! sf-cli catalog show 12
//!
//! # List the popular picks shown on the home page
//! sf-cli popular --limit 6
//!
//! # Insert clothes from a YAML file (needs SUPABASE_SERVICE_ROLE_KEY)
//! sf-cli seed clothes --file catalog.yaml
//! ```
//!
//! # Commands
//!
//! - `catalog` - Read the catalog with the anonymous key
//! - `popular` - Read popular recommendations
//! - `seed` - Validate and insert catalog data

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sf-cli")]
#[command(author, version, about = "StyleFinder CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect the catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// List popular recommended items
    Popular {
        /// Number of recommendation rows to read
        #[arg(short, long, default_value_t = 6)]
        limit: usize,
    },
    /// Seed Supabase tables
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List clothes, newest first
    List {
        /// Only this category (`women`, `men`, `kids`, `accessories`)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show one cloth
    Show {
        /// Cloth id
        id: i64,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert clothes from a YAML file
    Clothes {
        /// Path to the YAML file
        #[arg(short, long)]
        file: String,
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
        Commands::Catalog { action } => match action {
            CatalogAction::List { category } => {
                commands::catalog::list(category.as_deref()).await?;
            }
            CatalogAction::Show { id } => commands::catalog::show(id).await?,
        },
        Commands::Popular { limit } => commands::catalog::popular(limit).await?,
        Commands::Seed { target } => match target {
            SeedTarget::Clothes { file } => commands::seed::clothes(&file).await?,
        },
    }
    Ok(())
}
