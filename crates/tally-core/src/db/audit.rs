//! Authorization decision log
//!
//! Every authorization check writes exactly one row here before the request
//! proceeds; rows are never updated or deleted through the application.

use rusqlite::params;

use crate::error::Result;
use crate::models::{AuditRecord, AuditStatus};

use super::Database;

/// An authorization decision to be recorded
#[derive(Debug, Clone)]
pub struct AuthzDecision<'a> {
    pub user_id: Option<i64>,
    pub role: Option<&'a str>,
    pub ip: &'a str,
    pub path: &'a str,
    pub resource: &'a str,
    pub action: &'a str,
    pub status: AuditStatus,
    pub reason: &'a str,
}

impl Database {
    /// Record an authorization decision
    pub fn log_decision(&self, decision: &AuthzDecision) -> Result<i64> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO audit_log (user_id, role, ip, path, resource, action, status, reason)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                decision.user_id,
                decision.role,
                decision.ip,
                decision.path,
                decision.resource,
                decision.action,
                decision.status.as_str(),
                decision.reason,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List audit records, newest first
    pub fn list_audit(&self, limit: i64) -> Result<Vec<AuditRecord>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, role, ip, path, resource, action, status, reason, timestamp
            FROM audit_log
            ORDER BY id DESC
            LIMIT ?
            "#,
        )?;

        let records = stmt
            .query_map(params![limit], |row| {
                let status_str: String = row.get(7)?;
                Ok(AuditRecord {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    role: row.get(2)?,
                    ip: row.get(3)?,
                    path: row.get(4)?,
                    resource: row.get(5)?,
                    action: row.get(6)?,
                    status: status_str.parse().unwrap_or(AuditStatus::Denied),
                    reason: row.get(8)?,
                    timestamp: row.get(9)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Count audit records (for tests and the status command)
    pub fn count_audit(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM audit_log", [], |row| row.get(0))?;
        Ok(count)
    }
}
