//! Order payload parsing and conversion into core ingestion records.

use thiserror::Error;

use bulklink_core::models::{ExternalOrder, OrderAddress, OrderCustomer, OrderLineItem};

use crate::wire::{id_to_string, ShopifyAddress, ShopifyOrder};

/// Payload parsing errors.
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid payload format: {0}")]
    InvalidFormat(String),
}

pub type PayloadResult<T> = Result<T, PayloadError>;

/// Parse an orders payload.
///
/// Accepts both the REST envelope (`{"orders": [...]}`) and a bare array,
/// since admin surfaces forward either shape.
pub fn parse_orders_payload(json: &str) -> PayloadResult<Vec<ShopifyOrder>> {
    let value: serde_json::Value = serde_json::from_str(json)?;

    let orders_value = match &value {
        serde_json::Value::Array(_) => value.clone(),
        serde_json::Value::Object(map) => map
            .get("orders")
            .cloned()
            .ok_or_else(|| PayloadError::InvalidFormat("missing 'orders' field".into()))?,
        _ => {
            return Err(PayloadError::InvalidFormat(
                "expected an object or array".into(),
            ))
        }
    };

    Ok(serde_json::from_value(orders_value)?)
}

/// Convert wire orders into the records core ingestion consumes.
pub fn to_external_orders(orders: Vec<ShopifyOrder>) -> Vec<ExternalOrder> {
    orders.into_iter().map(to_external_order).collect()
}

fn to_external_order(order: ShopifyOrder) -> ExternalOrder {
    ExternalOrder {
        id: id_to_string(&order.id),
        order_number: order.order_number.as_ref().map(id_to_string),
        created_at: order.created_at,
        customer: OrderCustomer {
            email: order.customer.email,
            first_name: order.customer.first_name,
            last_name: order.customer.last_name,
        },
        billing_address: order.billing_address.map(to_address),
        shipping_address: order.shipping_address.map(to_address),
        line_items: order
            .line_items
            .into_iter()
            .map(|item| OrderLineItem {
                id: id_to_string(&item.id),
                product_id: id_to_string(&item.product_id),
                variant_id: item.variant_id.as_ref().map(id_to_string),
                title: item.title,
                variant_title: item.variant_title,
                sku: item.sku,
                quantity: item.quantity,
                price: parse_money(&item.price),
            })
            .collect(),
        total_price: order
            .total_price
            .as_deref()
            .map(parse_money)
            .unwrap_or(0.0),
    }
}

fn to_address(address: ShopifyAddress) -> OrderAddress {
    OrderAddress {
        first_name: address.first_name,
        last_name: address.last_name,
        address1: address.address1,
        address2: address.address2,
        city: address.city,
        province: address.province,
        country: address.country,
        zip: address.zip,
    }
}

/// Parse a wire money string; malformed amounts read as zero rather than
/// poisoning the whole payload.
fn parse_money(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(0.0)
}
