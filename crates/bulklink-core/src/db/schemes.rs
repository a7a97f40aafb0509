//! Product scheme database operations.

use rusqlite::{params, Connection, OptionalExtension};

use super::{Database, DbResult};
use crate::models::ProductScheme;

impl Database {
    /// Insert or update a scheme, keyed by SKU.
    ///
    /// Re-ingestion refreshes the title, image, and price fields in place;
    /// the row id and allocation policy are preserved.
    pub fn upsert_scheme(&self, scheme: &ProductScheme) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO product_schemes (
                id, sku, title, image, unit_price, bulk_price,
                minimum_bulk_qty, max_units_per_link, product_id, variant_id,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, datetime('now'))
            ON CONFLICT(sku) DO UPDATE SET
                title = excluded.title,
                image = COALESCE(excluded.image, image),
                unit_price = excluded.unit_price,
                bulk_price = excluded.bulk_price,
                product_id = COALESCE(excluded.product_id, product_id),
                variant_id = COALESCE(excluded.variant_id, variant_id),
                updated_at = datetime('now')
            "#,
            params![
                scheme.id,
                scheme.sku,
                scheme.title,
                scheme.image,
                scheme.unit_price,
                scheme.bulk_price,
                scheme.minimum_bulk_qty,
                scheme.max_units_per_link,
                scheme.product_id,
                scheme.variant_id,
                scheme.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a scheme by id.
    pub fn scheme_by_id(&self, id: &str) -> DbResult<Option<ProductScheme>> {
        scheme_by_id(&self.conn, id)
    }

    /// Get a scheme by SKU.
    pub fn scheme_by_sku(&self, sku: &str) -> DbResult<Option<ProductScheme>> {
        scheme_row(&self.conn, "sku", sku)
    }
}

/// Get a scheme by id on an arbitrary connection (usable inside a transaction).
pub fn scheme_by_id(conn: &Connection, id: &str) -> DbResult<Option<ProductScheme>> {
    scheme_row(conn, "id", id)
}

fn scheme_row(conn: &Connection, column: &str, value: &str) -> DbResult<Option<ProductScheme>> {
    let sql = format!(
        r#"
        SELECT id, sku, title, image, unit_price, bulk_price,
               minimum_bulk_qty, max_units_per_link, product_id, variant_id,
               created_at, updated_at
        FROM product_schemes
        WHERE {} = ?
        "#,
        column
    );

    conn.query_row(&sql, [value], |row| {
        Ok(ProductScheme {
            id: row.get(0)?,
            sku: row.get(1)?,
            title: row.get(2)?,
            image: row.get(3)?,
            unit_price: row.get(4)?,
            bulk_price: row.get(5)?,
            minimum_bulk_qty: row.get(6)?,
            max_units_per_link: row.get(7)?,
            product_id: row.get(8)?,
            variant_id: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    })
    .optional()
    .map_err(Into::into)
}
