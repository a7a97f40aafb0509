//! Bulk purchase database operations.

use rusqlite::{params, Connection, OptionalExtension};

use super::{ConditionalUpdate, Database, DbError, DbResult};
use crate::models::{BulkPurchase, PurchaseStatus};

impl Database {
    /// Insert a new bulk purchase.
    pub fn insert_purchase(&self, purchase: &BulkPurchase) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO bulk_purchases (
                id, client_id, source_order_id, source_order_number,
                product_sku, product_title, product_id, variant_id, variant_title,
                quantity_purchased, quantity_remaining, unit_cost, total_cost, status,
                customer_name, customer_email, billing_name, billing_address,
                shipping_name, shipping_address, order_date, discount_code, custom_link,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25
            )
            "#,
            params![
                purchase.id,
                purchase.client_id,
                purchase.source_order_id,
                purchase.source_order_number,
                purchase.product_sku,
                purchase.product_title,
                purchase.product_id,
                purchase.variant_id,
                purchase.variant_title,
                purchase.quantity_purchased,
                purchase.quantity_remaining,
                purchase.unit_cost,
                purchase.total_cost,
                status_to_string(&purchase.status),
                purchase.customer_name,
                purchase.customer_email,
                purchase.billing_name,
                purchase.billing_address,
                purchase.shipping_name,
                purchase.shipping_address,
                purchase.order_date,
                purchase.discount_code,
                purchase.custom_link,
                purchase.created_at,
                purchase.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Get a purchase by id.
    pub fn purchase_by_id(&self, id: &str) -> DbResult<Option<BulkPurchase>> {
        purchase_by_id(&self.conn, id)
    }

    /// Get a purchase by its external source order id.
    pub fn purchase_by_source_order(&self, source_order_id: &str) -> DbResult<Option<BulkPurchase>> {
        purchase_row(&self.conn, "source_order_id", source_order_id)
    }

    /// List purchases belonging to a client, newest first.
    pub fn list_purchases_for_client(&self, client_id: &str) -> DbResult<Vec<BulkPurchase>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE client_id = ? ORDER BY created_at DESC",
            SELECT_PURCHASE
        ))?;
        let rows = stmt.query_map([client_id], map_purchase_row)?;

        let mut purchases = Vec::new();
        for row in rows {
            purchases.push(row?.try_into()?);
        }
        Ok(purchases)
    }

    /// Administrative status correction (expiry or cancellation policy).
    ///
    /// The remaining balance is left untouched; only the redemption engine
    /// moves it.
    pub fn set_purchase_status(&self, id: &str, status: PurchaseStatus) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE bulk_purchases SET status = ?2, updated_at = datetime('now') WHERE id = ?1",
            params![id, status_to_string(&status)],
        )?;
        Ok(rows_affected > 0)
    }
}

/// Get a purchase by id on an arbitrary connection (usable inside a transaction).
pub fn purchase_by_id(conn: &Connection, id: &str) -> DbResult<Option<BulkPurchase>> {
    purchase_row(conn, "id", id)
}

/// Guarded inventory decrement.
///
/// Only matches while the purchase is ACTIVE with at least `quantity` units
/// remaining; the same statement flips the status to COMPLETED when the
/// balance reaches zero. A zero affected-row count signals a lost race and
/// the caller must roll back its transaction.
pub fn decrement_purchase_remaining(
    conn: &Connection,
    purchase_id: &str,
    quantity: i64,
) -> DbResult<ConditionalUpdate> {
    let rows_affected = conn.execute(
        r#"
        UPDATE bulk_purchases
        SET quantity_remaining = quantity_remaining - ?2,
            status = CASE WHEN quantity_remaining - ?2 = 0 THEN 'COMPLETED' ELSE status END,
            updated_at = datetime('now')
        WHERE id = ?1
          AND status = 'ACTIVE'
          AND quantity_remaining >= ?2
        "#,
        params![purchase_id, quantity],
    )?;
    Ok(ConditionalUpdate::from_rows(rows_affected))
}

const SELECT_PURCHASE: &str = r#"
    SELECT id, client_id, source_order_id, source_order_number,
           product_sku, product_title, product_id, variant_id, variant_title,
           quantity_purchased, quantity_remaining, unit_cost, total_cost, status,
           customer_name, customer_email, billing_name, billing_address,
           shipping_name, shipping_address, order_date, discount_code, custom_link,
           created_at, updated_at
    FROM bulk_purchases
"#;

fn purchase_row(conn: &Connection, column: &str, value: &str) -> DbResult<Option<BulkPurchase>> {
    let sql = format!("{} WHERE {} = ?", SELECT_PURCHASE, column);
    conn.query_row(&sql, [value], map_purchase_row)
        .optional()?
        .map(|row| row.try_into())
        .transpose()
}

fn map_purchase_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PurchaseRow> {
    Ok(PurchaseRow {
        id: row.get(0)?,
        client_id: row.get(1)?,
        source_order_id: row.get(2)?,
        source_order_number: row.get(3)?,
        product_sku: row.get(4)?,
        product_title: row.get(5)?,
        product_id: row.get(6)?,
        variant_id: row.get(7)?,
        variant_title: row.get(8)?,
        quantity_purchased: row.get(9)?,
        quantity_remaining: row.get(10)?,
        unit_cost: row.get(11)?,
        total_cost: row.get(12)?,
        status: row.get(13)?,
        customer_name: row.get(14)?,
        customer_email: row.get(15)?,
        billing_name: row.get(16)?,
        billing_address: row.get(17)?,
        shipping_name: row.get(18)?,
        shipping_address: row.get(19)?,
        order_date: row.get(20)?,
        discount_code: row.get(21)?,
        custom_link: row.get(22)?,
        created_at: row.get(23)?,
        updated_at: row.get(24)?,
    })
}

/// Intermediate row struct for database mapping.
struct PurchaseRow {
    id: String,
    client_id: String,
    source_order_id: String,
    source_order_number: Option<String>,
    product_sku: String,
    product_title: String,
    product_id: Option<String>,
    variant_id: Option<String>,
    variant_title: Option<String>,
    quantity_purchased: i64,
    quantity_remaining: i64,
    unit_cost: f64,
    total_cost: f64,
    status: String,
    customer_name: Option<String>,
    customer_email: Option<String>,
    billing_name: Option<String>,
    billing_address: Option<String>,
    shipping_name: Option<String>,
    shipping_address: Option<String>,
    order_date: Option<String>,
    discount_code: Option<String>,
    custom_link: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<PurchaseRow> for BulkPurchase {
    type Error = DbError;

    fn try_from(row: PurchaseRow) -> Result<Self, Self::Error> {
        Ok(BulkPurchase {
            id: row.id,
            client_id: row.client_id,
            source_order_id: row.source_order_id,
            source_order_number: row.source_order_number,
            product_sku: row.product_sku,
            product_title: row.product_title,
            product_id: row.product_id,
            variant_id: row.variant_id,
            variant_title: row.variant_title,
            quantity_purchased: row.quantity_purchased,
            quantity_remaining: row.quantity_remaining,
            unit_cost: row.unit_cost,
            total_cost: row.total_cost,
            status: string_to_status(&row.status)?,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            billing_name: row.billing_name,
            billing_address: row.billing_address,
            shipping_name: row.shipping_name,
            shipping_address: row.shipping_address,
            order_date: row.order_date,
            discount_code: row.discount_code,
            custom_link: row.custom_link,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn status_to_string(status: &PurchaseStatus) -> &'static str {
    match status {
        PurchaseStatus::Active => "ACTIVE",
        PurchaseStatus::Completed => "COMPLETED",
        PurchaseStatus::Expired => "EXPIRED",
        PurchaseStatus::Cancelled => "CANCELLED",
    }
}

fn string_to_status(s: &str) -> Result<PurchaseStatus, DbError> {
    match s {
        "ACTIVE" => Ok(PurchaseStatus::Active),
        "COMPLETED" => Ok(PurchaseStatus::Completed),
        "EXPIRED" => Ok(PurchaseStatus::Expired),
        "CANCELLED" => Ok(PurchaseStatus::Cancelled),
        _ => Err(DbError::Constraint(format!("Unknown purchase status: {}", s))),
    }
}
