//! Budget operations

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{Budget, NewBudget};

impl Database {
    /// Insert a budget, returning its id
    pub fn insert_budget(&self, budget: &NewBudget) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO budgets (user_id, category_id, target, start_date, end_date, notes)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                budget.user_id,
                budget.category_id,
                budget.target,
                budget.start_date.to_string(),
                budget.end_date.to_string(),
                budget.notes,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// List budgets; `owner` of `None` lists every user's budgets
    pub fn list_budgets(&self, owner: Option<i64>) -> Result<Vec<Budget>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, category_id, target, start_date, end_date, notes, created_at \
             FROM budgets WHERE (?1 IS NULL OR user_id = ?1) ORDER BY id",
        )?;
        let budgets = stmt
            .query_map(params![owner], Self::row_to_budget)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(budgets)
    }

    /// Get a single budget by id
    pub fn get_budget(&self, id: i64) -> Result<Option<Budget>> {
        let conn = self.conn()?;
        let budget = conn
            .prepare(
                "SELECT id, user_id, category_id, target, start_date, end_date, notes, created_at \
                 FROM budgets WHERE id = ?",
            )?
            .query_row(params![id], Self::row_to_budget)
            .optional()?;
        Ok(budget)
    }

    /// Overwrite a budget's mutable fields
    pub fn update_budget(&self, id: i64, budget: &NewBudget) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE budgets SET category_id = ?, target = ?, start_date = ?, end_date = ?, \
             notes = ? WHERE id = ?",
            params![
                budget.category_id,
                budget.target,
                budget.start_date.to_string(),
                budget.end_date.to_string(),
                budget.notes,
                id,
            ],
        )?;
        Ok(())
    }

    /// Delete a budget
    pub fn delete_budget(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM budgets WHERE id = ?", params![id])?;
        Ok(())
    }

    pub(crate) fn row_to_budget(row: &rusqlite::Row) -> rusqlite::Result<Budget> {
        let start_str: String = row.get(4)?;
        let end_str: String = row.get(5)?;
        let created_at_str: String = row.get(7)?;
        Ok(Budget {
            id: row.get(0)?,
            user_id: row.get(1)?,
            category_id: row.get(2)?,
            target: row.get(3)?,
            start_date: chrono::NaiveDate::parse_from_str(&start_str, "%Y-%m-%d")
                .unwrap_or_default(),
            end_date: chrono::NaiveDate::parse_from_str(&end_str, "%Y-%m-%d").unwrap_or_default(),
            notes: row.get(6)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}
