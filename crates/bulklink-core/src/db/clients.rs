//! Client account database operations.

use rusqlite::{params, Connection, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{ClientAccount, ClientRole};

impl Database {
    /// Insert a new client account.
    pub fn insert_client(&self, client: &ClientAccount) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO clients (
                id, email, name, first_name, last_name, role, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                client.id,
                client.email,
                client.name,
                client.first_name,
                client.last_name,
                role_to_string(&client.role),
                client.created_at,
                client.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Get a client by id.
    pub fn client_by_id(&self, id: &str) -> DbResult<Option<ClientAccount>> {
        client_row(&self.conn, "id", id)
    }

    /// Get a client by contact email (the ingestion key).
    pub fn client_by_email(&self, email: &str) -> DbResult<Option<ClientAccount>> {
        client_row(&self.conn, "email", email)
    }
}

fn client_row(conn: &Connection, column: &str, value: &str) -> DbResult<Option<ClientAccount>> {
    let sql = format!(
        r#"
        SELECT id, email, name, first_name, last_name, role, created_at, updated_at
        FROM clients
        WHERE {} = ?
        "#,
        column
    );

    conn.query_row(&sql, [value], |row| {
        Ok(ClientRow {
            id: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            first_name: row.get(3)?,
            last_name: row.get(4)?,
            role: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    })
    .optional()?
    .map(|row| row.try_into())
    .transpose()
}

/// Intermediate row struct for database mapping.
struct ClientRow {
    id: String,
    email: String,
    name: String,
    first_name: Option<String>,
    last_name: Option<String>,
    role: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ClientRow> for ClientAccount {
    type Error = DbError;

    fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
        Ok(ClientAccount {
            id: row.id,
            email: row.email,
            name: row.name,
            first_name: row.first_name,
            last_name: row.last_name,
            role: string_to_role(&row.role)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn role_to_string(role: &ClientRole) -> &'static str {
    match role {
        ClientRole::Admin => "ADMIN",
        ClientRole::Client => "CLIENT",
    }
}

fn string_to_role(s: &str) -> Result<ClientRole, DbError> {
    match s {
        "ADMIN" => Ok(ClientRole::Admin),
        "CLIENT" => Ok(ClientRole::Client),
        _ => Err(DbError::Constraint(format!("Unknown client role: {}", s))),
    }
}
