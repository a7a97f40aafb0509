//! Shopify REST wire types.
//!
//! Field subsets of the Admin API payloads this system consumes. Prices
//! arrive as strings on the wire; conversion to numbers happens when the
//! payloads cross into core records.

use serde::{Deserialize, Serialize};

/// Customer block on an order payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShopifyCustomer {
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Billing or shipping address block.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ShopifyAddress {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
}

/// Line item on an order payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShopifyLineItem {
    pub id: serde_json::Value,
    pub product_id: serde_json::Value,
    #[serde(default)]
    pub variant_id: Option<serde_json::Value>,
    pub title: String,
    #[serde(default)]
    pub variant_title: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    pub quantity: i64,
    pub price: String,
}

/// An order as returned by `GET /admin/api/{ver}/orders.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShopifyOrder {
    pub id: serde_json::Value,
    #[serde(default)]
    pub order_number: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<String>,
    pub customer: ShopifyCustomer,
    #[serde(default)]
    pub billing_address: Option<ShopifyAddress>,
    #[serde(default)]
    pub shipping_address: Option<ShopifyAddress>,
    pub line_items: Vec<ShopifyLineItem>,
    #[serde(default)]
    pub total_price: Option<String>,
}

/// A product variant as returned by the products endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShopifyVariant {
    pub id: serde_json::Value,
    #[serde(default)]
    pub product_id: Option<serde_json::Value>,
    #[serde(default)]
    pub title: Option<String>,
    pub price: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub inventory_item_id: Option<serde_json::Value>,
    #[serde(default)]
    pub inventory_quantity: Option<i64>,
}

/// Product image block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShopifyImage {
    #[serde(default)]
    pub src: Option<String>,
}

/// A product as returned by `GET /admin/api/{ver}/products.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShopifyProduct {
    pub id: serde_json::Value,
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub variants: Vec<ShopifyVariant>,
    #[serde(default)]
    pub image: Option<ShopifyImage>,
}

/// One row of `GET /admin/api/{ver}/inventory_levels.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShopifyInventoryLevel {
    pub inventory_item_id: serde_json::Value,
    pub location_id: serde_json::Value,
    #[serde(default)]
    pub available: Option<i64>,
}

/// Render a wire id (number or string on the wire) as a string.
pub(crate) fn id_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
