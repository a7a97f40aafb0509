//! Patient link models.

use serde::{Deserialize, Serialize};

/// A limited-use capability token bound to one bulk purchase.
///
/// No inventory is reserved when a link is issued; redemption is
/// first-come-first-served against the parent purchase's remaining balance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientLink {
    /// Unique identifier
    pub id: String,
    /// Issuing client account
    pub client_id: String,
    /// Parent bulk purchase
    pub bulk_purchase_id: String,
    /// Product scheme governing the granted quantity
    pub product_scheme_id: String,
    /// High-entropy capability token (unique)
    pub link_token: String,
    /// Shareable path (`patient/{token}`)
    pub custom_url: String,
    /// Human-readable discount code, minted independently of the token
    pub discount_code: String,
    /// Redemption budget (at least 1)
    pub max_uses: i64,
    /// Redemptions so far
    pub current_uses: i64,
    /// Whether the issuer has kept the link active
    pub is_active: bool,
    /// Expiry timestamp (RFC3339); a missing value counts as expired
    pub expires_at: Option<String>,
    /// Bound patient email (set at issuance or on first redemption)
    pub patient_email: Option<String>,
    /// Bound patient name
    pub patient_name: Option<String>,
    /// Issuer notes
    pub notes: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl PatientLink {
    /// Remaining redemption budget.
    pub fn uses_left(&self) -> i64 {
        (self.max_uses - self.current_uses).max(0)
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}
