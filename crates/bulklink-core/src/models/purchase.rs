//! Bulk purchase models.

use serde::{Deserialize, Serialize};

/// Bulk purchase lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseStatus {
    /// Units remain and links may be issued/redeemed against it
    Active,
    /// Remaining balance reached zero
    Completed,
    /// Closed by expiry policy
    Expired,
    /// Closed by administrative correction
    Cancelled,
}

/// A paid batch of product units owned by one client.
///
/// `quantity_purchased` is immutable after creation. `quantity_remaining` is
/// the single shared mutable resource in the system; only the redemption
/// engine decrements it. Customer and address fields are snapshots taken at
/// ingestion time and are never re-derived from the client profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BulkPurchase {
    /// Unique identifier
    pub id: String,
    /// Owning client account
    pub client_id: String,
    /// External order id - the idempotency key for ingestion
    pub source_order_id: String,
    /// Human-facing order number from the storefront
    pub source_order_number: Option<String>,
    /// Product SKU
    pub product_sku: String,
    /// Product title at purchase time
    pub product_title: String,
    /// External storefront product identifier
    pub product_id: Option<String>,
    /// External storefront variant identifier
    pub variant_id: Option<String>,
    /// Variant title at purchase time
    pub variant_title: Option<String>,
    /// Units bought (immutable)
    pub quantity_purchased: i64,
    /// Units not yet allocated to fulfillments
    pub quantity_remaining: i64,
    /// Per-unit cost paid
    pub unit_cost: f64,
    /// Total paid for the batch
    pub total_cost: f64,
    /// Lifecycle status
    pub status: PurchaseStatus,
    /// Customer name snapshot
    pub customer_name: Option<String>,
    /// Customer email snapshot
    pub customer_email: Option<String>,
    /// Billing contact snapshot
    pub billing_name: Option<String>,
    /// Billing address snapshot (single line)
    pub billing_address: Option<String>,
    /// Shipping contact snapshot
    pub shipping_name: Option<String>,
    /// Shipping address snapshot (single line)
    pub shipping_address: Option<String>,
    /// Storefront order date
    pub order_date: Option<String>,
    /// Discount code minted at ingestion
    pub discount_code: Option<String>,
    /// Shareable storefront link minted at ingestion
    pub custom_link: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl BulkPurchase {
    /// Create a new active purchase with the full balance remaining.
    pub fn new(
        client_id: String,
        source_order_id: String,
        product_sku: String,
        product_title: String,
        quantity: i64,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            client_id,
            source_order_id,
            source_order_number: None,
            product_sku,
            product_title,
            product_id: None,
            variant_id: None,
            variant_title: None,
            quantity_purchased: quantity,
            quantity_remaining: quantity,
            unit_cost: 0.0,
            total_cost: 0.0,
            status: PurchaseStatus::Active,
            customer_name: None,
            customer_email: None,
            billing_name: None,
            billing_address: None,
            shipping_name: None,
            shipping_address: None,
            order_date: None,
            discount_code: None,
            custom_link: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Check whether links may still be issued against this purchase.
    pub fn is_issuable(&self) -> bool {
        self.status == PurchaseStatus::Active && self.quantity_remaining > 0
    }
}
