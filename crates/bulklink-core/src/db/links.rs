//! Patient link database operations.

use rusqlite::{params, Connection, OptionalExtension};

use super::{ConditionalUpdate, Database, DbResult};
use crate::models::PatientLink;

impl Database {
    /// Insert a new patient link.
    pub fn insert_link(&self, link: &PatientLink) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO patient_links (
                id, client_id, bulk_purchase_id, product_scheme_id,
                link_token, custom_url, discount_code, max_uses, current_uses,
                is_active, expires_at, patient_email, patient_name, notes,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
            params![
                link.id,
                link.client_id,
                link.bulk_purchase_id,
                link.product_scheme_id,
                link.link_token,
                link.custom_url,
                link.discount_code,
                link.max_uses,
                link.current_uses,
                link.is_active,
                link.expires_at,
                link.patient_email,
                link.patient_name,
                link.notes,
                link.created_at,
                link.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Get a link by its capability token.
    pub fn link_by_token(&self, token: &str) -> DbResult<Option<PatientLink>> {
        link_by_token(&self.conn, token)
    }

    /// Get a link by id.
    pub fn link_by_id(&self, id: &str) -> DbResult<Option<PatientLink>> {
        link_row(&self.conn, "id", id)
    }

    /// List links issued by a client, newest first, optionally scoped to one
    /// purchase.
    pub fn list_links_for_client(
        &self,
        client_id: &str,
        bulk_purchase_id: Option<&str>,
    ) -> DbResult<Vec<PatientLink>> {
        let mut links = Vec::new();

        match bulk_purchase_id {
            Some(purchase_id) => {
                let mut stmt = self.conn.prepare(&format!(
                    "{} WHERE client_id = ?1 AND bulk_purchase_id = ?2 ORDER BY created_at DESC",
                    SELECT_LINK
                ))?;
                let rows = stmt.query_map(params![client_id, purchase_id], map_link_row)?;
                for row in rows {
                    links.push(row?);
                }
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "{} WHERE client_id = ?1 ORDER BY created_at DESC",
                    SELECT_LINK
                ))?;
                let rows = stmt.query_map([client_id], map_link_row)?;
                for row in rows {
                    links.push(row?);
                }
            }
        }

        Ok(links)
    }

    /// Deactivate a link (issuer-side kill switch).
    pub fn deactivate_link(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE patient_links SET is_active = 0, updated_at = datetime('now') WHERE id = ?",
            [id],
        )?;
        Ok(rows_affected > 0)
    }
}

/// Get a link by token on an arbitrary connection (usable inside a transaction).
pub fn link_by_token(conn: &Connection, token: &str) -> DbResult<Option<PatientLink>> {
    link_row(conn, "link_token", token)
}

/// Guarded usage increment, binding the patient identity to the link.
///
/// Only matches while the link is active with budget left. A zero
/// affected-row count signals a lost race and the caller must roll back its
/// transaction.
pub fn increment_link_uses(
    conn: &Connection,
    link_id: &str,
    patient_email: &str,
    patient_name: &str,
) -> DbResult<ConditionalUpdate> {
    let rows_affected = conn.execute(
        r#"
        UPDATE patient_links
        SET current_uses = current_uses + 1,
            patient_email = ?2,
            patient_name = ?3,
            updated_at = datetime('now')
        WHERE id = ?1
          AND is_active = 1
          AND current_uses < max_uses
        "#,
        params![link_id, patient_email, patient_name],
    )?;
    Ok(ConditionalUpdate::from_rows(rows_affected))
}

const SELECT_LINK: &str = r#"
    SELECT id, client_id, bulk_purchase_id, product_scheme_id,
           link_token, custom_url, discount_code, max_uses, current_uses,
           is_active, expires_at, patient_email, patient_name, notes,
           created_at, updated_at
    FROM patient_links
"#;

fn link_row(conn: &Connection, column: &str, value: &str) -> DbResult<Option<PatientLink>> {
    let sql = format!("{} WHERE {} = ?", SELECT_LINK, column);
    conn.query_row(&sql, [value], map_link_row)
        .optional()
        .map_err(Into::into)
}

fn map_link_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PatientLink> {
    Ok(PatientLink {
        id: row.get(0)?,
        client_id: row.get(1)?,
        bulk_purchase_id: row.get(2)?,
        product_scheme_id: row.get(3)?,
        link_token: row.get(4)?,
        custom_url: row.get(5)?,
        discount_code: row.get(6)?,
        max_uses: row.get(7)?,
        current_uses: row.get(8)?,
        is_active: row.get(9)?,
        expires_at: row.get(10)?,
        patient_email: row.get(11)?,
        patient_name: row.get(12)?,
        notes: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}
