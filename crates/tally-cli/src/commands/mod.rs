//! Command implementations

use std::path::Path;

use anyhow::{Context, Result};

use tally_core::db::Database;
use tally_core::models::Role;

mod serve;

pub use serve::cmd_serve;

/// Open the database, honoring the encryption flag
pub fn open_db(path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    let db = if no_encrypt {
        Database::new_unencrypted(path_str)?
    } else {
        Database::new(path_str)?
    };
    Ok(db)
}

/// Initialize the database and seed the sample users
pub fn cmd_init(path: &Path, no_encrypt: bool) -> Result<()> {
    let db = open_db(path, no_encrypt)?;
    db.seed_users()?;

    println!("✅ Database initialized at {}", path.display());
    println!("   Users: {}", db.count_users()?);
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    Ok(())
}

/// Create a user account with any role
pub fn cmd_user_add(db: &Database, email: &str, password: &str, role: &str) -> Result<()> {
    let role: Role = role
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let hash = tally_core::auth::hash_password(password)?;
    let id = db.create_user(email, &hash, role)?;

    println!("✅ Created user {} ({}) with id {}", email, role, id);
    Ok(())
}

/// List user accounts
pub fn cmd_user_list(db: &Database) -> Result<()> {
    let users = db.list_users()?;
    if users.is_empty() {
        println!("No users. Run 'tally init' or 'tally user add'.");
        return Ok(());
    }

    println!("{:<6} {:<32} {:<14} CREATED", "ID", "EMAIL", "ROLE");
    for user in users {
        println!(
            "{:<6} {:<32} {:<14} {}",
            user.id,
            user.email,
            user.role.as_str(),
            user.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

/// Show database status
pub fn cmd_status(path: &Path, no_encrypt: bool) -> Result<()> {
    let db = open_db(path, no_encrypt)?;

    println!("Database: {}", path.display());
    println!(
        "Encryption: {}",
        if db.is_encrypted()? { "enabled" } else { "disabled" }
    );
    println!("Users: {}", db.count_users()?);
    println!("Transactions: {}", db.count_transactions()?);
    println!("Audit records: {}", db.count_audit()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_add_rejects_unknown_role() {
        let db = Database::in_memory().unwrap();
        let err = cmd_user_add(&db, "x@example.com", "pw", "superuser").unwrap_err();
        assert!(err.to_string().contains("Unknown role"));
    }

    #[test]
    fn user_add_can_provision_admin() {
        let db = Database::in_memory().unwrap();
        cmd_user_add(&db, "root@example.com", "pw", "admin").unwrap();
        let user = db.get_user_by_email("root@example.com").unwrap().unwrap();
        assert_eq!(user.role, Role::Admin);
    }
}
