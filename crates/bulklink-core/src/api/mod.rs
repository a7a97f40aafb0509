//! Request/response facade over the domain services.
//!
//! Maps domain results onto the HTTP-style status codes the outer web layer
//! returns. The facade owns the database behind a mutex; each operation is a
//! short-lived request handler.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::config::StorefrontConfig;
use crate::db::{Database, DbError};
use crate::ingest::{CatalogClient, IngestError, OrderIngestor, SyncReport};
use crate::links::{CreateLinkRequest, IssueError, LinkIssuer, LinkValidity};
use crate::models::{
    BulkPurchase, ExternalOrder, PatientFulfillment, PatientLink, ProductScheme, RequestMeta,
};
use crate::redeem::{FulfillmentOutcome, RedeemError, RedeemRequest, RedemptionEngine};

/// API errors, each carrying its outward status code.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid or expired link")]
    NotFound,

    #[error("This link is no longer available")]
    Gone(LinkValidity),

    #[error("Internal server error")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 400,
            ApiError::NotFound => 404,
            ApiError::Gone(_) => 410,
            ApiError::Internal(_) => 500,
        }
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<RedeemError> for ApiError {
    fn from(e: RedeemError) -> Self {
        match e {
            RedeemError::Validation(field) => ApiError::Validation(field.to_string()),
            RedeemError::UnknownToken => ApiError::NotFound,
            RedeemError::Gone(reasons) => ApiError::Gone(reasons),
            RedeemError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<IssueError> for ApiError {
    fn from(e: IssueError) -> Self {
        match e {
            // Eligibility and existence collapse into one outward answer
            IssueError::NotEligible => ApiError::NotFound,
            IssueError::InvalidMaxUses => ApiError::Validation(e.to_string()),
            IssueError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for ApiError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ApiError::Internal(format!("Lock poisoned: {}", e))
    }
}

/// Scheme fields exposed on the patient-facing status view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeSummary {
    pub title: String,
    pub sku: String,
    pub image: Option<String>,
    pub max_units_per_link: i64,
    pub unit_price: f64,
}

impl From<&ProductScheme> for SchemeSummary {
    fn from(scheme: &ProductScheme) -> Self {
        Self {
            title: scheme.title.clone(),
            sku: scheme.sku.clone(),
            image: scheme.image.clone(),
            max_units_per_link: scheme.max_units_per_link,
            unit_price: scheme.unit_price,
        }
    }
}

/// Purchase fields exposed on the patient-facing status view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseSummary {
    pub id: String,
    pub product_title: String,
    pub customer_name: Option<String>,
    pub quantity_remaining: i64,
    pub status: crate::models::PurchaseStatus,
}

impl From<&BulkPurchase> for PurchaseSummary {
    fn from(purchase: &BulkPurchase) -> Self {
        Self {
            id: purchase.id.clone(),
            product_title: purchase.product_title.clone(),
            customer_name: purchase.customer_name.clone(),
            quantity_remaining: purchase.quantity_remaining,
            status: purchase.status,
        }
    }
}

/// `GET /patient/link/{token}` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkStatusResponse {
    pub link: PatientLink,
    pub scheme: SchemeSummary,
    pub purchase: PurchaseSummary,
    pub fulfillments: Vec<PatientFulfillment>,
}

/// `POST /patient/link/{token}/redeem` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionResponse {
    pub success: bool,
    pub fulfillment: PatientFulfillment,
    pub checkout_url: Option<String>,
    pub discount_code: String,
}

/// Thread-safe application facade.
pub struct AppService {
    db: Arc<Mutex<Database>>,
    config: StorefrontConfig,
}

impl AppService {
    /// Wrap an already-open database.
    pub fn new(db: Database, config: StorefrontConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            config,
        }
    }

    /// Open or create a database at the given path.
    pub fn open(path: &str, config: StorefrontConfig) -> ApiResult<Self> {
        Ok(Self::new(Database::open(path)?, config))
    }

    /// Create an in-memory service (for testing).
    pub fn open_in_memory(config: StorefrontConfig) -> ApiResult<Self> {
        Ok(Self::new(Database::open_in_memory()?, config))
    }

    /// Read-only link status with computed validity.
    ///
    /// Unknown tokens are 404; unusable links are 410 with reason flags.
    pub fn link_status(&self, token: &str) -> ApiResult<LinkStatusResponse> {
        let db = self.db.lock()?;

        let link = db.link_by_token(token)?.ok_or(ApiError::NotFound)?;
        let purchase = db
            .purchase_by_id(&link.bulk_purchase_id)?
            .ok_or_else(|| ApiError::Internal("dangling purchase reference".into()))?;
        let scheme = db
            .scheme_by_id(&link.product_scheme_id)?
            .ok_or_else(|| ApiError::Internal("dangling scheme reference".into()))?;

        let validity = LinkValidity::evaluate(&link, &purchase, chrono::Utc::now());
        if !validity.usable() {
            return Err(ApiError::Gone(validity));
        }

        let fulfillments = db.list_fulfillments_for_link(&link.id)?;
        Ok(LinkStatusResponse {
            link,
            scheme: SchemeSummary::from(&scheme),
            purchase: PurchaseSummary::from(&purchase),
            fulfillments,
        })
    }

    /// Redeem a link.
    pub fn redeem_link(
        &self,
        token: &str,
        request: &RedeemRequest,
        meta: &RequestMeta,
    ) -> ApiResult<RedemptionResponse> {
        let mut db = self.db.lock()?;
        let engine = RedemptionEngine::new(&self.config);

        let outcome = engine.redeem(&mut db, token, request, meta).map_err(|e| {
            if let RedeemError::Database(ref db_err) = e {
                error!(error = %db_err, "redemption failed unexpectedly");
            }
            ApiError::from(e)
        })?;

        let FulfillmentOutcome {
            fulfillment,
            checkout_url,
            discount_code,
        } = outcome;
        Ok(RedemptionResponse {
            success: true,
            fulfillment,
            checkout_url,
            discount_code,
        })
    }

    /// Create a patient link for an authenticated client.
    pub fn create_patient_link(
        &self,
        client_id: &str,
        request: &CreateLinkRequest,
    ) -> ApiResult<PatientLink> {
        let db = self.db.lock()?;
        let issuer = LinkIssuer::new(&self.config);
        Ok(issuer.create_link(&db, client_id, request)?)
    }

    /// List a client's links, optionally scoped to one purchase.
    pub fn list_patient_links(
        &self,
        client_id: &str,
        bulk_purchase_id: Option<&str>,
    ) -> ApiResult<Vec<PatientLink>> {
        let db = self.db.lock()?;
        Ok(db.list_links_for_client(client_id, bulk_purchase_id)?)
    }

    /// Run an order sync against the given catalog.
    pub fn sync_orders(
        &self,
        orders: &[ExternalOrder],
        catalog: &dyn CatalogClient,
    ) -> ApiResult<SyncReport> {
        let mut db = self.db.lock()?;
        let ingestor = OrderIngestor::new(&self.config, catalog);
        Ok(ingestor.sync_orders(&mut db, orders)?)
    }
}
