//! External order records consumed by ingestion.
//!
//! These are the storefront-neutral shapes the ingestor understands. The
//! storefront boundary crate parses vendor payloads into this format.

use serde::{Deserialize, Serialize};

/// Customer contact on an external order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderCustomer {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl OrderCustomer {
    /// Combined display name, empty when neither part is present.
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}

/// Billing or shipping address on an external order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OrderAddress {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub zip: Option<String>,
}

impl OrderAddress {
    /// Contact name for snapshotting.
    pub fn contact_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }

    /// Single-line rendering for snapshotting.
    pub fn single_line(&self) -> String {
        format!(
            "{} {}, {}, {} {}",
            self.address1.as_deref().unwrap_or(""),
            self.address2.as_deref().unwrap_or(""),
            self.city.as_deref().unwrap_or(""),
            self.province.as_deref().unwrap_or(""),
            self.zip.as_deref().unwrap_or(""),
        )
        .trim()
        .to_string()
    }
}

/// One line item on an external order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLineItem {
    pub id: String,
    pub product_id: String,
    pub variant_id: Option<String>,
    pub title: String,
    pub variant_title: Option<String>,
    /// Items without a SKU are skipped by ingestion
    pub sku: Option<String>,
    pub quantity: i64,
    /// Per-unit price
    pub price: f64,
}

/// An external order record, one per storefront order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExternalOrder {
    /// Storefront order id - the ingestion idempotency key
    pub id: String,
    /// Human-facing order number
    pub order_number: Option<String>,
    /// Storefront creation timestamp
    pub created_at: Option<String>,
    pub customer: OrderCustomer,
    pub billing_address: Option<OrderAddress>,
    pub shipping_address: Option<OrderAddress>,
    pub line_items: Vec<OrderLineItem>,
    pub total_price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_trims_missing_parts() {
        let customer = OrderCustomer {
            email: "clinic@example.com".into(),
            first_name: Some("Ada".into()),
            last_name: None,
        };
        assert_eq!(customer.full_name(), "Ada");

        let nameless = OrderCustomer {
            email: "clinic@example.com".into(),
            first_name: None,
            last_name: None,
        };
        assert_eq!(nameless.full_name(), "");
    }

    #[test]
    fn test_address_single_line() {
        let address = OrderAddress {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            address1: Some("12 Clinic Way".into()),
            city: Some("Springfield".into()),
            province: Some("IL".into()),
            zip: Some("62701".into()),
            ..Default::default()
        };
        assert_eq!(address.contact_name(), "Ada Lovelace");
        assert_eq!(address.single_line(), "12 Clinic Way , Springfield, IL 62701");
    }
}
