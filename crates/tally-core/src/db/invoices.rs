//! Invoice operations
//!
//! Line items are stored as a JSON column; totals are computed by the
//! caller (see `totals`) before anything reaches this layer.

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Invoice, InvoiceStatus, InvoiceWithClient, NewInvoice};

const INVOICE_COLUMNS: &str = "i.id, i.user_id, i.client_id, i.invoice_number, i.status, \
     i.issue_date, i.due_date, i.items, i.subtotal, i.tax_amount, i.total, i.currency, \
     i.notes, i.created_at";

impl Database {
    /// Insert an invoice; fails with `Conflict` if the invoice number is taken
    pub fn insert_invoice(&self, invoice: &NewInvoice) -> Result<i64> {
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM invoices WHERE invoice_number = ?",
                params![invoice.invoice_number],
                |row| row.get(0),
            )
            .optional()?;

        if existing.is_some() {
            return Err(Error::Conflict("invoice_number_exists".to_string()));
        }

        conn.execute(
            r#"
            INSERT INTO invoices
                (user_id, client_id, invoice_number, status, issue_date, due_date, items,
                 subtotal, tax_amount, total, currency, notes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                invoice.user_id,
                invoice.client_id,
                invoice.invoice_number,
                invoice.status.as_str(),
                invoice.issue_date.to_string(),
                invoice.due_date.to_string(),
                serde_json::to_string(&invoice.items)?,
                invoice.subtotal,
                invoice.tax_amount,
                invoice.total,
                invoice.currency,
                invoice.notes,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List invoices with the referenced client's display fields joined in
    ///
    /// `owner` of `None` lists every user's invoices (admin/client_mgmt scope).
    pub fn list_invoices(&self, owner: Option<i64>) -> Result<Vec<InvoiceWithClient>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {}, c.name, c.email FROM invoices i \
             LEFT JOIN clients c ON i.client_id = c.id \
             WHERE (?1 IS NULL OR i.user_id = ?1) ORDER BY i.id",
            INVOICE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let invoices = stmt
            .query_map(params![owner], Self::row_to_invoice_with_client)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(invoices)
    }

    /// Get a single invoice by id, with client display fields
    pub fn get_invoice(&self, id: i64) -> Result<Option<InvoiceWithClient>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {}, c.name, c.email FROM invoices i \
             LEFT JOIN clients c ON i.client_id = c.id WHERE i.id = ?",
            INVOICE_COLUMNS
        );
        let invoice = conn
            .prepare(&sql)?
            .query_row(params![id], Self::row_to_invoice_with_client)
            .optional()?;
        Ok(invoice)
    }

    /// Overwrite an invoice's mutable fields (items and totals included)
    pub fn update_invoice(&self, id: i64, invoice: &NewInvoice) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            UPDATE invoices
            SET client_id = ?, status = ?, issue_date = ?, due_date = ?, items = ?,
                subtotal = ?, tax_amount = ?, total = ?, currency = ?, notes = ?
            WHERE id = ?
            "#,
            params![
                invoice.client_id,
                invoice.status.as_str(),
                invoice.issue_date.to_string(),
                invoice.due_date.to_string(),
                serde_json::to_string(&invoice.items)?,
                invoice.subtotal,
                invoice.tax_amount,
                invoice.total,
                invoice.currency,
                invoice.notes,
                id,
            ],
        )?;
        Ok(())
    }

    /// Delete an invoice
    pub fn delete_invoice(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM invoices WHERE id = ?", params![id])?;
        Ok(())
    }

    fn row_to_invoice_with_client(row: &rusqlite::Row) -> rusqlite::Result<InvoiceWithClient> {
        let status_str: String = row.get(4)?;
        let issue_str: String = row.get(5)?;
        let due_str: String = row.get(6)?;
        let items_json: String = row.get(7)?;
        let created_at_str: String = row.get(13)?;
        Ok(InvoiceWithClient {
            invoice: Invoice {
                id: row.get(0)?,
                user_id: row.get(1)?,
                client_id: row.get(2)?,
                invoice_number: row.get(3)?,
                status: status_str.parse().unwrap_or(InvoiceStatus::Draft),
                issue_date: chrono::NaiveDate::parse_from_str(&issue_str, "%Y-%m-%d")
                    .unwrap_or_default(),
                due_date: chrono::NaiveDate::parse_from_str(&due_str, "%Y-%m-%d")
                    .unwrap_or_default(),
                items: serde_json::from_str(&items_json).unwrap_or_default(),
                subtotal: row.get(8)?,
                tax_amount: row.get(9)?,
                total: row.get(10)?,
                currency: row.get(11)?,
                notes: row.get(12)?,
                created_at: parse_datetime(&created_at_str),
            },
            client_name: row.get(14)?,
            client_email: row.get(15)?,
        })
    }
}
