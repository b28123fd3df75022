//! User account operations

use rusqlite::{params, OptionalExtension};
use tracing::info;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Role, User};

impl Database {
    /// Create a user; fails with `Conflict` if the email is already taken
    pub fn create_user(&self, email: &str, password_hash: &str, role: Role) -> Result<i64> {
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM users WHERE email = ?",
                params![email],
                |row| row.get(0),
            )
            .optional()?;

        if existing.is_some() {
            return Err(Error::Conflict("email_exists".to_string()));
        }

        conn.execute(
            "INSERT INTO users (email, password_hash, role) VALUES (?, ?, ?)",
            params![email, password_hash, role.as_str()],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Look up a user by email
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .prepare(
                "SELECT id, email, password_hash, role, created_at FROM users WHERE email = ?",
            )?
            .query_row(params![email], Self::row_to_user)
            .optional()?;
        Ok(user)
    }

    /// Look up a user by id
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .prepare("SELECT id, email, password_hash, role, created_at FROM users WHERE id = ?")?
            .query_row(params![id], Self::row_to_user)
            .optional()?;
        Ok(user)
    }

    /// List all users, oldest first
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, email, password_hash, role, created_at FROM users ORDER BY id",
        )?;
        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Count registered users
    pub fn count_users(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Seed sample users when the users table is empty (idempotent)
    ///
    /// One account per persona, so a fresh install is immediately usable.
    pub fn seed_users(&self) -> Result<()> {
        if self.count_users()? > 0 {
            return Ok(());
        }

        let samples: &[(&str, &str, Role)] = &[
            ("admin@example.com", "admin123", Role::Admin),
            ("cm@example.com", "cm123", Role::ClientMgmt),
            ("salary@example.com", "salary123", Role::Salary),
            ("self@example.com", "self123", Role::SelfEmployed),
            ("acct@example.com", "acct123", Role::Accountant),
        ];

        for (email, password, role) in samples {
            let hash = crate::auth::hash_password(password)?;
            self.create_user(email, &hash, *role)?;
        }

        info!("Seeded sample users");
        Ok(())
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        let role_str: String = row.get(3)?;
        let created_at_str: String = row.get(4)?;
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            password_hash: row.get(2)?,
            role: role_str.parse().unwrap_or(Role::Viewer),
            created_at: parse_datetime(&created_at_str),
        })
    }
}
