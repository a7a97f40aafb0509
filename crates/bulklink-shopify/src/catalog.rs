//! Catalog lookups over preloaded product payloads.

use serde::{Deserialize, Serialize};

use bulklink_core::ingest::{CatalogClient, CatalogEntry, CatalogError, CatalogResult, StockLevel};

use crate::orders::{PayloadError, PayloadResult};
use crate::wire::{id_to_string, ShopifyInventoryLevel, ShopifyProduct};

/// Inventory health buckets used by stock displays.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

/// Bucket a total available quantity.
pub fn stock_status(total_available: i64) -> StockStatus {
    if total_available > 10 {
        StockStatus::InStock
    } else if total_available > 0 {
        StockStatus::LowStock
    } else {
        StockStatus::OutOfStock
    }
}

/// Sum available units across locations.
pub fn total_available(levels: &[StockLevel]) -> i64 {
    levels.iter().map(|level| level.available).sum()
}

/// Catalog client backed by payloads fetched ahead of time.
///
/// The caller performs the actual REST fetches (or replays recorded
/// responses in tests) and hands the JSON here.
pub struct StaticCatalog {
    products: Vec<ShopifyProduct>,
    levels: Vec<StockLevel>,
}

impl StaticCatalog {
    /// Build from already-parsed payloads.
    pub fn new(products: Vec<ShopifyProduct>, levels: Vec<ShopifyInventoryLevel>) -> Self {
        let levels = levels
            .into_iter()
            .map(|level| StockLevel {
                inventory_item_id: id_to_string(&level.inventory_item_id),
                location_id: id_to_string(&level.location_id),
                available: level.available.unwrap_or(0),
            })
            .collect();
        Self { products, levels }
    }

    /// Build from a products payload (`{"products": [...]}` or bare array).
    pub fn from_products_json(json: &str) -> PayloadResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;

        let products_value = match &value {
            serde_json::Value::Array(_) => value.clone(),
            serde_json::Value::Object(map) => map
                .get("products")
                .cloned()
                .ok_or_else(|| PayloadError::InvalidFormat("missing 'products' field".into()))?,
            _ => {
                return Err(PayloadError::InvalidFormat(
                    "expected an object or array".into(),
                ))
            }
        };

        let products: Vec<ShopifyProduct> = serde_json::from_value(products_value)?;
        Ok(Self::new(products, Vec::new()))
    }

    /// Attach inventory levels parsed from a separate payload.
    pub fn with_inventory_levels(mut self, levels: Vec<ShopifyInventoryLevel>) -> Self {
        self.levels = levels
            .into_iter()
            .map(|level| StockLevel {
                inventory_item_id: id_to_string(&level.inventory_item_id),
                location_id: id_to_string(&level.location_id),
                available: level.available.unwrap_or(0),
            })
            .collect();
        self
    }
}

impl CatalogClient for StaticCatalog {
    fn fetch_catalog_entry(&self, sku: &str) -> CatalogResult<Option<CatalogEntry>> {
        for product in &self.products {
            for variant in &product.variants {
                if variant.sku.as_deref() == Some(sku) {
                    let price = variant.price.trim().parse().ok();
                    return Ok(Some(CatalogEntry {
                        sku: sku.to_string(),
                        title: product.title.clone(),
                        product_id: id_to_string(&product.id),
                        variant_id: Some(id_to_string(&variant.id)),
                        image: product.image.as_ref().and_then(|img| img.src.clone()),
                        price,
                    }));
                }
            }
        }
        Ok(None)
    }

    fn fetch_stock_levels(&self, inventory_item_ids: &[String]) -> CatalogResult<Vec<StockLevel>> {
        if inventory_item_ids.is_empty() {
            return Ok(Vec::new());
        }
        if self.products.is_empty() && self.levels.is_empty() {
            return Err(CatalogError::Unavailable("no catalog loaded".into()));
        }
        Ok(self
            .levels
            .iter()
            .filter(|level| inventory_item_ids.contains(&level.inventory_item_id))
            .cloned()
            .collect())
    }
}
