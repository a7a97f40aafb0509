//! Patient fulfillment models.

use serde::{Deserialize, Serialize};

/// Requester metadata captured for audit on each fulfillment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RequestMeta {
    /// Requester IP address
    pub ip_address: Option<String>,
    /// Requester user agent
    pub user_agent: Option<String>,
}

/// Immutable audit record of one successful redemption.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientFulfillment {
    /// Unique identifier
    pub id: String,
    /// Redeemed link
    pub patient_link_id: String,
    /// Parent bulk purchase
    pub bulk_purchase_id: String,
    /// Patient email at redemption time
    pub patient_email: String,
    /// Patient name at redemption time
    pub patient_name: String,
    /// Units granted (the scheme's per-link allocation when redeemed)
    pub quantity_fulfilled: i64,
    /// Requester IP address
    pub ip_address: Option<String>,
    /// Requester user agent
    pub user_agent: Option<String>,
    /// Redemption timestamp
    pub fulfillment_date: String,
}

impl PatientFulfillment {
    /// Create a fulfillment record for a redemption happening now.
    pub fn new(
        patient_link_id: String,
        bulk_purchase_id: String,
        patient_email: String,
        patient_name: String,
        quantity_fulfilled: i64,
        meta: &RequestMeta,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_link_id,
            bulk_purchase_id,
            patient_email,
            patient_name,
            quantity_fulfilled,
            ip_address: meta.ip_address.clone(),
            user_agent: meta.user_agent.clone(),
            fulfillment_date: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_fulfillment() {
        let meta = RequestMeta {
            ip_address: Some("203.0.113.7".into()),
            user_agent: Some("test-agent".into()),
        };
        let fulfillment = PatientFulfillment::new(
            "link-1".into(),
            "purchase-1".into(),
            "patient@example.com".into(),
            "Pat Doe".into(),
            1,
            &meta,
        );
        assert_eq!(fulfillment.quantity_fulfilled, 1);
        assert_eq!(fulfillment.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(fulfillment.id.len(), 36);
    }
}
