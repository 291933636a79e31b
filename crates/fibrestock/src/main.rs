// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fibrestock - stock ledger and activity fulfillment engine for
//! fiber-optic field operations.
//!
//! This is the operator-facing binary: database initialization, stock
//! status, monthly summaries, and demo seeding. The engines themselves
//! live in the library crates and are driven by an embedding service.

use clap::{Parser, Subcommand};
use fibrestock_core::{FibrestockError, Principal, Role};
use fibrestock_storage::Database;

mod seed;
mod status;
mod summary;

/// Fibrestock - fiber-optic installation stock ledger.
#[derive(Parser, Debug)]
#[command(name = "fibrestock", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the database and apply pending migrations.
    Init,
    /// Show the stock dashboard.
    Status {
        /// Output structured JSON for scripting.
        #[arg(long)]
        json: bool,
    },
    /// Show the ledger summary for one calendar month.
    Summary {
        /// Year, defaults to the current one.
        #[arg(long)]
        year: Option<i32>,
        /// Month 1-12, defaults to the current one.
        #[arg(long)]
        month: Option<u32>,
        /// Output structured JSON for scripting.
        #[arg(long)]
        json: bool,
    },
    /// Load a small demo catalog into an empty database.
    Seed,
}

/// The local operator acts with full authority; real principals come from
/// the embedding service, not from this binary.
pub(crate) fn operator() -> Principal {
    Principal::new(0, "operator", Role::Administrator)
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fibrestock={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

async fn run_init(config: &fibrestock_config::FibrestockConfig) -> Result<(), FibrestockError> {
    let db = Database::open_with(&config.storage).await?;
    db.checkpoint().await?;
    println!("fibrestock: database ready at {}", config.storage.database_path);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match fibrestock_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            fibrestock_config::render_errors(errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.service.log_level);

    let result = match cli.command {
        Some(Commands::Init) => run_init(&config).await,
        Some(Commands::Status { json }) => status::run_status(&config, json).await,
        Some(Commands::Summary { year, month, json }) => {
            summary::run_summary(&config, year, month, json).await
        }
        Some(Commands::Seed) => seed::run_seed(&config).await,
        None => {
            println!("fibrestock: use --help for available commands");
            Ok(())
        }
    };
    if let Err(e) = result {
        eprintln!("fibrestock: {e}");
        std::process::exit(1);
    }
}
