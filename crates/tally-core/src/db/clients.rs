//! Client operations

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{Client, NewClient};

impl Database {
    /// Insert a client, returning its id
    pub fn insert_client(&self, client: &NewClient) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO clients (user_id, name, email, phone, address, gstin) \
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                client.user_id,
                client.name,
                client.email,
                client.phone,
                client.address,
                client.gstin,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// List clients; `owner` of `None` lists every user's clients
    /// (admin and client_mgmt scope)
    pub fn list_clients(&self, owner: Option<i64>) -> Result<Vec<Client>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, email, phone, address, gstin, created_at \
             FROM clients WHERE (?1 IS NULL OR user_id = ?1) ORDER BY id",
        )?;
        let clients = stmt
            .query_map(params![owner], Self::row_to_client)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(clients)
    }

    /// Get a single client by id
    pub fn get_client(&self, id: i64) -> Result<Option<Client>> {
        let conn = self.conn()?;
        let client = conn
            .prepare(
                "SELECT id, user_id, name, email, phone, address, gstin, created_at \
                 FROM clients WHERE id = ?",
            )?
            .query_row(params![id], Self::row_to_client)
            .optional()?;
        Ok(client)
    }

    /// Overwrite a client's mutable fields
    pub fn update_client(&self, id: i64, client: &NewClient) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE clients SET name = ?, email = ?, phone = ?, address = ?, gstin = ? \
             WHERE id = ?",
            params![
                client.name,
                client.email,
                client.phone,
                client.address,
                client.gstin,
                id,
            ],
        )?;
        Ok(())
    }

    /// Delete a client
    pub fn delete_client(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM clients WHERE id = ?", params![id])?;
        Ok(())
    }

    pub(crate) fn row_to_client(row: &rusqlite::Row) -> rusqlite::Result<Client> {
        let created_at_str: String = row.get(7)?;
        Ok(Client {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            email: row.get(3)?,
            phone: row.get(4)?,
            address: row.get(5)?,
            gstin: row.get(6)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}
