//! The redemption engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::StorefrontConfig;
use crate::db::{self, ConditionalUpdate, Database, DbError};
use crate::links::LinkValidity;
use crate::models::{PatientFulfillment, RequestMeta};

use super::checkout_reference;

/// Redemption errors.
#[derive(Error, Debug)]
pub enum RedeemError {
    #[error("Missing required fields")]
    Validation(&'static str),

    #[error("Invalid or expired link")]
    UnknownToken,

    #[error("This link is no longer available for use")]
    Gone(LinkValidity),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

pub type RedeemResult<T> = Result<T, RedeemError>;

/// Patient-supplied redemption fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRequest {
    pub patient_email: String,
    pub patient_name: String,
    /// Accepted for contact purposes; not persisted on the fulfillment
    pub phone: Option<String>,
}

/// Result of a successful redemption.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentOutcome {
    pub fulfillment: PatientFulfillment,
    pub checkout_url: Option<String>,
    pub discount_code: String,
}

/// Executes redemptions exactly once per eligible request.
///
/// The fulfillment insert, usage increment, and inventory decrement run in a
/// single transaction. Both updates are guarded conditionals; when either
/// reports [`ConditionalUpdate::NoOpDueToRace`] the transaction rolls back
/// and the attempt is reported as gone. A lost race is never retried here:
/// if the competing attempt committed, a retry would fulfill twice.
pub struct RedemptionEngine<'a> {
    config: &'a StorefrontConfig,
}

impl<'a> RedemptionEngine<'a> {
    /// Create a new engine.
    pub fn new(config: &'a StorefrontConfig) -> Self {
        Self { config }
    }

    /// Redeem the link identified by `token`.
    pub fn redeem(
        &self,
        db: &mut Database,
        token: &str,
        request: &RedeemRequest,
        meta: &RequestMeta,
    ) -> RedeemResult<FulfillmentOutcome> {
        let patient_email = request.patient_email.trim();
        let patient_name = request.patient_name.trim();
        if patient_email.is_empty() {
            return Err(RedeemError::Validation("patientEmail is required"));
        }
        if patient_name.is_empty() {
            return Err(RedeemError::Validation("patientName is required"));
        }

        let now = chrono::Utc::now();
        let tx = db.transaction()?;

        // Resolve and re-check under the transaction, not from a stale read.
        let link = db::link_by_token(&tx, token)?.ok_or(RedeemError::UnknownToken)?;
        let purchase = db::purchase_by_id(&tx, &link.bulk_purchase_id)?.ok_or_else(|| {
            DbError::NotFound(format!("bulk purchase {}", link.bulk_purchase_id))
        })?;
        let scheme = db::scheme_by_id(&tx, &link.product_scheme_id)?.ok_or_else(|| {
            DbError::NotFound(format!("product scheme {}", link.product_scheme_id))
        })?;

        let validity = LinkValidity::evaluate(&link, &purchase, now);
        if !validity.usable() {
            return Err(RedeemError::Gone(validity));
        }

        let quantity = scheme.max_units_per_link;
        let fulfillment = PatientFulfillment::new(
            link.id.clone(),
            purchase.id.clone(),
            patient_email.to_string(),
            patient_name.to_string(),
            quantity,
            meta,
        );
        db::insert_fulfillment(&tx, &fulfillment)?;

        match db::increment_link_uses(&tx, &link.id, patient_email, patient_name)? {
            ConditionalUpdate::Applied => {}
            ConditionalUpdate::NoOpDueToRace => {
                warn!(link_id = %link.id, "redemption lost usage race");
                return Err(RedeemError::Gone(LinkValidity::raced_fully_used()));
            }
        }

        match db::decrement_purchase_remaining(&tx, &purchase.id, quantity)? {
            ConditionalUpdate::Applied => {}
            ConditionalUpdate::NoOpDueToRace => {
                warn!(
                    link_id = %link.id,
                    bulk_purchase_id = %purchase.id,
                    "redemption lost inventory race"
                );
                return Err(RedeemError::Gone(LinkValidity::raced_no_inventory()));
            }
        }

        tx.commit().map_err(DbError::from)?;

        info!(
            link_id = %link.id,
            bulk_purchase_id = %purchase.id,
            quantity,
            "fulfilled patient link"
        );

        let checkout_url = checkout_reference(self.config, &scheme, &link.discount_code);
        Ok(FulfillmentOutcome {
            fulfillment,
            checkout_url,
            discount_code: link.discount_code,
        })
    }
}
