//! CLI argument definitions using clap
//!
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Multi-tenant personal and business finance tracker
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Self-hosted finance tracker with role-based access", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "tally.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default the database is encrypted using SQLCipher.
    /// Set the TALLY_DB_KEY environment variable with your passphrase.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and seed the sample users
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3001")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory for uploaded receipt files
        #[arg(long, default_value = "uploads")]
        uploads_dir: PathBuf,

        /// Skip seeding sample users into an empty database
        #[arg(long)]
        no_seed: bool,
    },

    /// Manage user accounts
    ///
    /// Registration over the API cannot self-assign the admin role;
    /// admin accounts are created here.
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Show database status (encryption, record counts)
    Status,
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Create a user with any role, including admin
    Add {
        /// Email address (unique)
        #[arg(long)]
        email: String,

        /// Password
        #[arg(long)]
        password: String,

        /// Role: admin, client_mgmt, self_employed, salary, accountant, viewer
        #[arg(long, default_value = "salary")]
        role: String,
    },

    /// List user accounts
    List,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
