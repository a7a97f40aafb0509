//! Pure link validity evaluation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{BulkPurchase, PatientLink, PurchaseStatus};

/// The four independent reasons a link may be unusable.
///
/// Evaluation is side-effect free and repeatable: the read path uses it for
/// status display, and the redemption engine re-evaluates it inside its
/// transaction so the decision never rests on a stale read.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LinkValidity {
    /// Issuer has deactivated the link
    pub inactive: bool,
    /// Expiry timestamp has passed (or is missing/unparseable)
    pub expired: bool,
    /// Usage budget is exhausted
    pub fully_used: bool,
    /// Parent purchase is not ACTIVE or has no units remaining
    pub no_bulk_inventory: bool,
}

impl LinkValidity {
    /// Evaluate a link against its parent purchase at `now`.
    pub fn evaluate(link: &PatientLink, purchase: &BulkPurchase, now: DateTime<Utc>) -> Self {
        let expired = match link.expires_at.as_deref() {
            Some(ts) => match DateTime::parse_from_rfc3339(ts) {
                Ok(expires_at) => expires_at.with_timezone(&Utc) < now,
                // An unreadable expiry must not grant indefinite validity
                Err(_) => true,
            },
            None => true,
        };

        let purchase_active =
            purchase.status == PurchaseStatus::Active && purchase.quantity_remaining > 0;

        Self {
            inactive: !link.is_active,
            expired,
            fully_used: link.current_uses >= link.max_uses,
            no_bulk_inventory: !purchase_active,
        }
    }

    /// A link is usable iff no reason applies.
    pub fn usable(&self) -> bool {
        !(self.inactive || self.expired || self.fully_used || self.no_bulk_inventory)
    }

    /// Race outcome: the usage budget was consumed by a concurrent request.
    pub(crate) fn raced_fully_used() -> Self {
        Self {
            fully_used: true,
            ..Default::default()
        }
    }

    /// Race outcome: the inventory was drained by a concurrent request.
    pub(crate) fn raced_no_inventory() -> Self {
        Self {
            no_bulk_inventory: true,
            ..Default::default()
        }
    }
}
