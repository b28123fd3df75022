//! Tally CLI - finance tracker server and admin tooling
//!
//! Usage:
//!   tally init                  Initialize database and seed sample users
//!   tally serve --port 3001     Start the REST API server
//!   tally user add --email ...  Provision a user (any role, including admin)
//!   tally status                Show database status

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            uploads_dir,
            no_seed,
        } => commands::cmd_serve(&cli.db, &host, port, &uploads_dir, no_seed, cli.no_encrypt).await,
        Commands::User { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                UserAction::Add {
                    email,
                    password,
                    role,
                } => commands::cmd_user_add(&db, &email, &password, &role),
                UserAction::List => commands::cmd_user_list(&db),
            }
        }
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
    }
}
