//! Product scheme models.

use serde::{Deserialize, Serialize};

/// Catalog entry describing pricing and per-link allocation for one SKU.
///
/// Schemes are upserted by SKU during order ingestion. Price updates never
/// reach past redemptions: the granted quantity is snapshotted onto each
/// fulfillment at redemption time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductScheme {
    /// Unique identifier
    pub id: String,
    /// Stock Keeping Unit - the upsert key
    pub sku: String,
    /// Product title
    pub title: String,
    /// Product image URL
    pub image: Option<String>,
    /// Retail price per unit
    pub unit_price: f64,
    /// Discounted per-unit price for bulk orders
    pub bulk_price: f64,
    /// Minimum quantity for an order to qualify as bulk
    pub minimum_bulk_qty: i64,
    /// Units granted per link redemption
    pub max_units_per_link: i64,
    /// External storefront product identifier
    pub product_id: Option<String>,
    /// External storefront variant identifier
    pub variant_id: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl ProductScheme {
    /// Create a new scheme with required fields.
    pub fn new(sku: String, title: String, unit_price: f64) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sku,
            title,
            image: None,
            unit_price,
            bulk_price: unit_price,
            minimum_bulk_qty: 10,
            max_units_per_link: 1,
            product_id: None,
            variant_id: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
