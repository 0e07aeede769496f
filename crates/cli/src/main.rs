//! Tienda CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! tienda-cli migrate
//!
//! # Bootstrap an administrator
//! tienda-cli admin create -u admin -e admin@example.com -n "Admin Name" -p Admin123
//!
//! # Load the starter catalog
//! tienda-cli seed catalog crates/cli/seed/catalog.yaml
//! ```
//!
//! Every command reads `TIENDA_DATABASE_URL` (or `DATABASE_URL`) and refuses
//! to run against the in-memory backend.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tienda-cli")]
#[command(author, version, about = "Tienda CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Manage administrator accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Load seed data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new administrator
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Full name
        #[arg(short, long)]
        name: String,

        /// Initial password (6-18 characters, one digit, one uppercase letter)
        #[arg(short, long)]
        password: String,

        /// Birth date (YYYY-MM-DD)
        #[arg(short, long, default_value = "1990-01-01")]
        birth_date: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert the products listed in a YAML file
    Catalog {
        /// Path to the catalog file
        file: PathBuf,
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
        Commands::Admin { action } => match action {
            AdminAction::Create {
                username,
                email,
                name,
                password,
                birth_date,
            } => {
                let admin = commands::admin::NewAdmin {
                    username,
                    email,
                    full_name: name,
                    password,
                    birth_date,
                };
                commands::admin::create_user(&admin).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file } => commands::seed::catalog(&file).await?,
        },
    }
    Ok(())
}
