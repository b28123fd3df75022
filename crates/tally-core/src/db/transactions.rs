//! Transaction operations

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{NewTransaction, Transaction, TransactionType};

const TRANSACTION_COLUMNS: &str = "id, user_id, date, amount, currency, type, category_id, \
     account, tags, vendor, client, project_id, invoice_id, receipt_url, reconciled, notes, \
     splits, created_at";

impl Database {
    /// Insert a transaction, returning its id
    pub fn insert_transaction(&self, tx: &NewTransaction) -> Result<i64> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO transactions
                (user_id, date, amount, currency, type, category_id, account, tags, vendor,
                 client, project_id, invoice_id, receipt_url, reconciled, notes, splits)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                tx.user_id,
                tx.date.to_string(),
                tx.amount,
                tx.currency,
                tx.tx_type.as_str(),
                tx.category_id,
                tx.account,
                serde_json::to_string(&tx.tags)?,
                tx.vendor,
                tx.client,
                tx.project_id,
                tx.invoice_id,
                tx.receipt_url,
                tx.reconciled,
                tx.notes,
                serde_json::to_string(&tx.splits)?,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List transactions, newest first
    ///
    /// `owner` of `None` lists every user's transactions (admin scope).
    pub fn list_transactions(&self, owner: Option<i64>) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM transactions WHERE (?1 IS NULL OR user_id = ?1) \
             ORDER BY date DESC, id DESC",
            TRANSACTION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let transactions = stmt
            .query_map(params![owner], Self::row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(transactions)
    }

    /// Get a single transaction by id
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM transactions WHERE id = ?", TRANSACTION_COLUMNS);
        let transaction = conn
            .prepare(&sql)?
            .query_row(params![id], Self::row_to_transaction)
            .optional()?;
        Ok(transaction)
    }

    /// Overwrite a transaction's mutable fields
    pub fn update_transaction(&self, id: i64, tx: &NewTransaction) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            UPDATE transactions
            SET date = ?, amount = ?, currency = ?, type = ?, category_id = ?, account = ?,
                tags = ?, vendor = ?, client = ?, project_id = ?, invoice_id = ?,
                receipt_url = ?, reconciled = ?, notes = ?, splits = ?
            WHERE id = ?
            "#,
            params![
                tx.date.to_string(),
                tx.amount,
                tx.currency,
                tx.tx_type.as_str(),
                tx.category_id,
                tx.account,
                serde_json::to_string(&tx.tags)?,
                tx.vendor,
                tx.client,
                tx.project_id,
                tx.invoice_id,
                tx.receipt_url,
                tx.reconciled,
                tx.notes,
                serde_json::to_string(&tx.splits)?,
                id,
            ],
        )?;
        Ok(())
    }

    /// Delete a transaction
    pub fn delete_transaction(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM transactions WHERE id = ?", params![id])?;
        Ok(())
    }

    /// Count all transactions
    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Helper to convert a row to Transaction
    /// Column order: id, user_id, date, amount, currency, type, category_id, account,
    ///               tags, vendor, client, project_id, invoice_id, receipt_url,
    ///               reconciled, notes, splits, created_at
    pub(crate) fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
        let date_str: String = row.get(2)?;
        let type_str: String = row.get(5)?;
        let tags_json: String = row.get(8)?;
        let reconciled_int: i64 = row.get(14)?;
        let splits_json: String = row.get(16)?;
        let created_at_str: String = row.get(17)?;
        Ok(Transaction {
            id: row.get(0)?,
            user_id: row.get(1)?,
            date: chrono::NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").unwrap_or_default(),
            amount: row.get(3)?,
            currency: row.get(4)?,
            tx_type: type_str.parse().unwrap_or(TransactionType::Expense),
            category_id: row.get(6)?,
            account: row.get(7)?,
            tags: serde_json::from_str(&tags_json).unwrap_or_default(),
            vendor: row.get(9)?,
            client: row.get(10)?,
            project_id: row.get(11)?,
            invoice_id: row.get(12)?,
            receipt_url: row.get(13)?,
            reconciled: reconciled_int != 0,
            notes: row.get(15)?,
            splits: serde_json::from_str(&splits_json)
                .unwrap_or(serde_json::Value::Array(vec![])),
            created_at: parse_datetime(&created_at_str),
        })
    }
}
