//! External catalog boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Catalog lookup errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed catalog payload: {0}")]
    Payload(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// A catalog entry resolved for one SKU.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    pub sku: String,
    pub title: String,
    pub product_id: String,
    pub variant_id: Option<String>,
    pub image: Option<String>,
    pub price: Option<f64>,
}

/// Available stock at one storefront location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockLevel {
    pub inventory_item_id: String,
    pub location_id: String,
    pub available: i64,
}

/// Read-only view of the external product catalog.
///
/// Passed into order ingestion (and any stock-lookup caller) instead of
/// being reached through a process-wide singleton.
pub trait CatalogClient {
    /// Resolve a SKU to its catalog entry, if the storefront knows it.
    fn fetch_catalog_entry(&self, sku: &str) -> CatalogResult<Option<CatalogEntry>>;

    /// Fetch stock levels for the given inventory item ids.
    fn fetch_stock_levels(&self, inventory_item_ids: &[String]) -> CatalogResult<Vec<StockLevel>>;
}

/// Catalog client for deployments with no storefront wired up.
pub struct NullCatalog;

impl CatalogClient for NullCatalog {
    fn fetch_catalog_entry(&self, _sku: &str) -> CatalogResult<Option<CatalogEntry>> {
        Ok(None)
    }

    fn fetch_stock_levels(&self, _inventory_item_ids: &[String]) -> CatalogResult<Vec<StockLevel>> {
        Ok(Vec::new())
    }
}
