//! Server command implementation

use std::path::Path;

use anyhow::Result;
use tracing::warn;

use tally_server::{ServerConfig, JWT_SECRET_ENV};

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    uploads_dir: &Path,
    no_seed: bool,
    no_encrypt: bool,
) -> Result<()> {
    println!("🚀 Starting Tally server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    println!("   Uploads: {}", uploads_dir.display());

    let jwt_secret = match std::env::var(JWT_SECRET_ENV) {
        Ok(secret) if !secret.is_empty() => secret,
        _ => {
            warn!(
                "{} not set; using the development signing secret. \
                 Do not expose this server to a network.",
                JWT_SECRET_ENV
            );
            "dev-secret".to_string()
        }
    };

    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    // A fresh install gets one account per persona (idempotent)
    if !no_seed {
        db.seed_users()?;
    }

    let config = ServerConfig {
        jwt_secret,
        uploads_dir: uploads_dir.to_path_buf(),
    };

    tally_server::serve(db, host, port, config).await?;

    Ok(())
}
