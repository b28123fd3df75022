//! Dashboard snapshot aggregation
//!
//! All figures are computed in SQL against the scoped transaction set.
//! Budget usage runs as a single statement with a correlated aggregate per
//! budget row rather than one query per budget.

use chrono::{Duration, NaiveDate};
use rusqlite::params;

use super::Database;
use crate::error::Result;
use crate::models::{BudgetProgress, DashboardSnapshot};

impl Database {
    /// Compute the dashboard snapshot for a scope
    ///
    /// `scope` of `None` aggregates system-wide (admin); otherwise only the
    /// given user's records are considered. `today` anchors the cashflow
    /// windows and the upcoming-bills cutoff.
    pub fn dashboard_snapshot(
        &self,
        scope: Option<i64>,
        today: NaiveDate,
    ) -> Result<DashboardSnapshot> {
        let balance = self.net_cashflow(scope, None)?;
        let cashflow_30d = self.net_cashflow(scope, Some(today - Duration::days(30)))?;
        let cashflow_90d = self.net_cashflow(scope, Some(today - Duration::days(90)))?;
        let upcoming_bills = self.count_upcoming_bills(scope, today)?;
        let budgets = self.budget_progress(scope)?;

        Ok(DashboardSnapshot {
            balance,
            cashflow_30d,
            cashflow_90d,
            upcoming_bills,
            budgets,
        })
    }

    /// Net income minus expense over the scope, optionally from a date
    /// (inclusive lower bound)
    fn net_cashflow(&self, scope: Option<i64>, from: Option<NaiveDate>) -> Result<f64> {
        let conn = self.conn()?;
        let net: f64 = conn.query_row(
            r#"
            SELECT COALESCE(SUM(CASE
                WHEN type = 'income' THEN amount
                WHEN type = 'expense' THEN -amount
                ELSE 0 END), 0.0)
            FROM transactions
            WHERE (?1 IS NULL OR user_id = ?1)
              AND (?2 IS NULL OR date >= ?2)
            "#,
            params![scope, from.map(|d| d.to_string())],
            |row| row.get(0),
        )?;
        Ok(net)
    }

    /// Scoped expense transactions dated strictly after `today`
    fn count_upcoming_bills(&self, scope: Option<i64>, today: NaiveDate) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            r#"
            SELECT COUNT(*) FROM transactions
            WHERE (?1 IS NULL OR user_id = ?1)
              AND type = 'expense'
              AND date > ?2
            "#,
            params![scope, today.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Per-budget usage for the scope, one statement for all budgets
    ///
    /// `used` sums scoped expense amounts in the budget's category within
    /// [start_date, end_date] inclusive. `progress` rounds used/target × 100
    /// and is 0 when the target is 0; the raw value may exceed 100.
    pub fn budget_progress(&self, scope: Option<i64>) -> Result<Vec<BudgetProgress>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT b.id, b.user_id, b.category_id, b.target, b.start_date, b.end_date,
                   b.notes, b.created_at,
                   COALESCE((
                       SELECT SUM(t.amount) FROM transactions t
                       WHERE t.type = 'expense'
                         AND t.category_id = b.category_id
                         AND t.date >= b.start_date
                         AND t.date <= b.end_date
                         AND (?1 IS NULL OR t.user_id = ?1)
                   ), 0.0) AS used
            FROM budgets b
            WHERE (?1 IS NULL OR b.user_id = ?1)
            ORDER BY b.id
            "#,
        )?;

        let budgets = stmt
            .query_map(params![scope], |row| {
                let budget = Self::row_to_budget(row)?;
                let used: f64 = row.get(8)?;
                let progress = if budget.target > 0.0 {
                    (used / budget.target * 100.0).round() as i64
                } else {
                    0
                };
                Ok(BudgetProgress {
                    budget,
                    used,
                    progress,
                    progress_display: progress.min(100),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(budgets)
    }
}
