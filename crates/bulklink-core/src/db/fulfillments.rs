//! Patient fulfillment database operations.

use rusqlite::{params, Connection};

use super::{Database, DbResult};
use crate::models::PatientFulfillment;

impl Database {
    /// List fulfillments recorded against a link, oldest first.
    pub fn list_fulfillments_for_link(&self, link_id: &str) -> DbResult<Vec<PatientFulfillment>> {
        list_fulfillments(&self.conn, "patient_link_id", link_id)
    }

    /// List fulfillments recorded against a purchase, oldest first.
    pub fn list_fulfillments_for_purchase(
        &self,
        purchase_id: &str,
    ) -> DbResult<Vec<PatientFulfillment>> {
        list_fulfillments(&self.conn, "bulk_purchase_id", purchase_id)
    }
}

/// Insert a fulfillment record (append-only; usable inside a transaction).
pub fn insert_fulfillment(conn: &Connection, fulfillment: &PatientFulfillment) -> DbResult<()> {
    conn.execute(
        r#"
        INSERT INTO patient_fulfillments (
            id, patient_link_id, bulk_purchase_id, patient_email, patient_name,
            quantity_fulfilled, ip_address, user_agent, fulfillment_date
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        params![
            fulfillment.id,
            fulfillment.patient_link_id,
            fulfillment.bulk_purchase_id,
            fulfillment.patient_email,
            fulfillment.patient_name,
            fulfillment.quantity_fulfilled,
            fulfillment.ip_address,
            fulfillment.user_agent,
            fulfillment.fulfillment_date,
        ],
    )?;
    Ok(())
}

fn list_fulfillments(
    conn: &Connection,
    column: &str,
    value: &str,
) -> DbResult<Vec<PatientFulfillment>> {
    let sql = format!(
        r#"
        SELECT id, patient_link_id, bulk_purchase_id, patient_email, patient_name,
               quantity_fulfilled, ip_address, user_agent, fulfillment_date
        FROM patient_fulfillments
        WHERE {} = ?
        ORDER BY fulfillment_date
        "#,
        column
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([value], |row| {
        Ok(PatientFulfillment {
            id: row.get(0)?,
            patient_link_id: row.get(1)?,
            bulk_purchase_id: row.get(2)?,
            patient_email: row.get(3)?,
            patient_name: row.get(4)?,
            quantity_fulfilled: row.get(5)?,
            ip_address: row.get(6)?,
            user_agent: row.get(7)?,
            fulfillment_date: row.get(8)?,
        })
    })?;

    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}
