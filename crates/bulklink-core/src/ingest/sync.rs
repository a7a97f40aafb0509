//! Idempotent order sync.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::StorefrontConfig;
use crate::db::{Database, DbError};
use crate::models::{BulkPurchase, ClientAccount, ExternalOrder, OrderLineItem, ProductScheme};

use super::CatalogClient;

/// Ingestion errors.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type IngestResult<T> = Result<T, IngestError>;

/// Decides whether a line item represents a bulk purchase.
///
/// The shipped heuristic is quantity-or-marker; deployments with different
/// conventions adjust the fields rather than the code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkOrderPredicate {
    /// Quantity at or above which a line item counts as bulk
    pub min_quantity: i64,
    /// Case-insensitive SKU substring marking explicit bulk listings
    pub sku_marker: String,
}

impl Default for BulkOrderPredicate {
    fn default() -> Self {
        Self {
            min_quantity: 10,
            sku_marker: "bulk".into(),
        }
    }
}

impl BulkOrderPredicate {
    /// Check a line item. Items without a SKU never match.
    pub fn matches(&self, item: &OrderLineItem) -> bool {
        let Some(sku) = item.sku.as_deref() else {
            return false;
        };
        item.quantity >= self.min_quantity
            || sku.to_lowercase().contains(&self.sku_marker.to_lowercase())
    }
}

/// Outcome of one sync run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    pub processed: usize,
    pub errors: usize,
    pub total: usize,
}

/// Transforms external bulk orders into ledger entries.
pub struct OrderIngestor<'a> {
    config: &'a StorefrontConfig,
    catalog: &'a dyn CatalogClient,
    predicate: BulkOrderPredicate,
}

impl<'a> OrderIngestor<'a> {
    /// Create an ingestor with the default bulk heuristic.
    pub fn new(config: &'a StorefrontConfig, catalog: &'a dyn CatalogClient) -> Self {
        Self {
            config,
            catalog,
            predicate: BulkOrderPredicate::default(),
        }
    }

    /// Replace the bulk heuristic.
    pub fn with_predicate(mut self, predicate: BulkOrderPredicate) -> Self {
        self.predicate = predicate;
        self
    }

    /// Ingest a batch of orders.
    ///
    /// Already-processed orders are skipped; a failing order is recorded on
    /// its sync record and does not abort the rest of the batch.
    pub fn sync_orders(&self, db: &mut Database, orders: &[ExternalOrder]) -> IngestResult<SyncReport> {
        let mut report = SyncReport {
            total: orders.len(),
            ..Default::default()
        };

        for order in orders {
            if let Some(record) = db.order_sync_record(&order.id)? {
                if record.processed {
                    continue;
                }
            }

            match self.ingest_order(db, order) {
                Ok(()) => {
                    db.mark_order_processed(&order.id)?;
                    report.processed += 1;
                }
                Err(e) => {
                    warn!(source_order_id = %order.id, error = %e, "order ingestion failed");
                    // Best effort: the sync record may not exist if serialization failed
                    let _ = db.record_order_error(&order.id, &e.to_string());
                    report.errors += 1;
                }
            }
        }

        info!(
            processed = report.processed,
            errors = report.errors,
            total = report.total,
            "order sync completed"
        );
        Ok(report)
    }

    fn ingest_order(&self, db: &mut Database, order: &ExternalOrder) -> IngestResult<()> {
        let payload = serde_json::to_string(order)?;
        let payload_hash = hex::encode(Sha256::digest(payload.as_bytes()));
        db.upsert_order_sync(
            &order.id,
            order.order_number.as_deref(),
            &payload,
            &payload_hash,
        )?;

        for item in &order.line_items {
            let Some(sku) = item.sku.as_deref() else {
                continue;
            };
            if !self.predicate.matches(item) {
                continue;
            }

            let scheme = self.upsert_scheme(db, item, sku)?;
            let client = self.resolve_client(db, order)?;

            // One purchase per source order; a rerun finds it and moves on
            if db.purchase_by_source_order(&order.id)?.is_none() {
                let purchase = self.build_purchase(order, item, &client, &scheme);
                db.insert_purchase(&purchase)?;
                info!(
                    bulk_purchase_id = %purchase.id,
                    source_order_id = %order.id,
                    quantity = purchase.quantity_purchased,
                    "recorded bulk purchase"
                );
            }
        }

        Ok(())
    }

    fn upsert_scheme(
        &self,
        db: &Database,
        item: &OrderLineItem,
        sku: &str,
    ) -> IngestResult<ProductScheme> {
        let mut scheme = ProductScheme::new(sku.to_string(), item.title.clone(), item.price);
        scheme.bulk_price = item.price * 0.8;
        scheme.minimum_bulk_qty = self.predicate.min_quantity;
        scheme.product_id = Some(item.product_id.clone());
        scheme.variant_id = item.variant_id.clone();

        // Backfill gaps from the catalog; a dark storefront is not an error
        if scheme.variant_id.is_none() || scheme.image.is_none() {
            match self.catalog.fetch_catalog_entry(sku) {
                Ok(Some(entry)) => {
                    if scheme.variant_id.is_none() {
                        scheme.variant_id = entry.variant_id;
                    }
                    if scheme.image.is_none() {
                        scheme.image = entry.image;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(sku, error = %e, "catalog lookup failed"),
            }
        }

        db.upsert_scheme(&scheme)?;
        // Re-read: the upsert may have kept an earlier row id
        db.scheme_by_sku(sku)?
            .ok_or_else(|| DbError::NotFound(format!("product scheme {}", sku)).into())
    }

    fn resolve_client(&self, db: &Database, order: &ExternalOrder) -> IngestResult<ClientAccount> {
        if let Some(existing) = db.client_by_email(&order.customer.email)? {
            return Ok(existing);
        }

        let mut client = ClientAccount::new(
            order.customer.email.clone(),
            order.customer.full_name(),
        );
        client.first_name = order.customer.first_name.clone();
        client.last_name = order.customer.last_name.clone();
        db.insert_client(&client)?;
        info!(client_id = %client.id, "created client account from order contact");
        Ok(client)
    }

    fn build_purchase(
        &self,
        order: &ExternalOrder,
        item: &OrderLineItem,
        client: &ClientAccount,
        scheme: &ProductScheme,
    ) -> BulkPurchase {
        let mut purchase = BulkPurchase::new(
            client.id.clone(),
            order.id.clone(),
            scheme.sku.clone(),
            item.title.clone(),
            item.quantity,
        );
        purchase.source_order_number = order.order_number.clone();
        purchase.product_id = Some(item.product_id.clone());
        purchase.variant_id = item.variant_id.clone();
        purchase.variant_title = item.variant_title.clone();
        purchase.unit_cost = item.price;
        purchase.total_cost = item.price * item.quantity as f64;
        purchase.order_date = order.created_at.clone();

        // Snapshots: these must read as they did on the order, forever
        purchase.customer_name = Some(order.customer.full_name());
        purchase.customer_email = Some(order.customer.email.clone());
        purchase.billing_name = order.billing_address.as_ref().map(|a| a.contact_name());
        purchase.billing_address = order.billing_address.as_ref().map(|a| a.single_line());
        purchase.shipping_name = order.shipping_address.as_ref().map(|a| a.contact_name());
        purchase.shipping_address = order.shipping_address.as_ref().map(|a| a.single_line());

        let order_suffix: String = order
            .id
            .chars()
            .rev()
            .take(8)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        let discount_code = format!("PATIENT_{}_{}", scheme.sku, order_suffix);
        purchase.custom_link = self
            .config
            .base_url()
            .map(|base| format!("{}/discount/{}", base, discount_code));
        purchase.discount_code = Some(discount_code);

        purchase
    }
}
