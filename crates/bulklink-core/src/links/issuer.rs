//! Patient link issuance.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::StorefrontConfig;
use crate::db::{Database, DbError};
use crate::models::PatientLink;

/// Issuance errors.
#[derive(Error, Debug)]
pub enum IssueError {
    /// Purchase missing, not owned by the caller, not ACTIVE, or drained.
    /// Reported identically in all four cases so callers cannot probe for
    /// the existence of purchases they do not own.
    #[error("Bulk purchase not found or no remaining units")]
    NotEligible,

    #[error("max_uses must be at least 1")]
    InvalidMaxUses,

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

pub type IssueResult<T> = Result<T, IssueError>;

/// Parameters for creating a patient link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    pub bulk_purchase_id: String,
    pub patient_email: Option<String>,
    pub patient_name: Option<String>,
    pub notes: Option<String>,
    #[serde(default = "default_max_uses")]
    pub max_uses: i64,
}

fn default_max_uses() -> i64 {
    1
}

/// Issues patient links against eligible bulk purchases.
///
/// Issuance reserves nothing: several links may be written against the same
/// remaining balance and redemption settles them first-come-first-served.
pub struct LinkIssuer<'a> {
    config: &'a StorefrontConfig,
}

impl<'a> LinkIssuer<'a> {
    /// Create a new issuer.
    pub fn new(config: &'a StorefrontConfig) -> Self {
        Self { config }
    }

    /// Create a link for `client_id` against an eligible purchase.
    pub fn create_link(
        &self,
        db: &Database,
        client_id: &str,
        request: &CreateLinkRequest,
    ) -> IssueResult<PatientLink> {
        if request.max_uses < 1 {
            return Err(IssueError::InvalidMaxUses);
        }

        let purchase = db
            .purchase_by_id(&request.bulk_purchase_id)?
            .ok_or(IssueError::NotEligible)?;
        if purchase.client_id != client_id || !purchase.is_issuable() {
            return Err(IssueError::NotEligible);
        }

        let scheme = db
            .scheme_by_sku(&purchase.product_sku)?
            .ok_or(IssueError::NotEligible)?;

        let link_token = generate_token();
        let discount_code = generate_discount_code(&self.config.discount_prefix);
        let now = chrono::Utc::now();
        let expires_at = now + self.config.link_validity();

        let link = PatientLink {
            id: uuid::Uuid::new_v4().to_string(),
            client_id: client_id.to_string(),
            bulk_purchase_id: purchase.id.clone(),
            product_scheme_id: scheme.id,
            custom_url: format!("patient/{}", link_token),
            link_token,
            discount_code,
            max_uses: request.max_uses,
            current_uses: 0,
            is_active: true,
            expires_at: Some(expires_at.to_rfc3339()),
            patient_email: request.patient_email.clone(),
            patient_name: request.patient_name.clone(),
            notes: request.notes.clone(),
            created_at: now.to_rfc3339(),
            updated_at: now.to_rfc3339(),
        };

        db.insert_link(&link)?;
        info!(
            link_id = %link.id,
            bulk_purchase_id = %purchase.id,
            max_uses = link.max_uses,
            "issued patient link"
        );
        Ok(link)
    }
}

/// 32 random bytes, hex encoded: 256 bits of token entropy.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Discount code from 8 random bytes, drawn independently of the token.
fn generate_discount_code(prefix: &str) -> String {
    let mut bytes = [0u8; 8];
    OsRng.fill_bytes(&mut bytes);
    format!("{}-{}", prefix, hex::encode_upper(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BulkPurchase, ClientAccount, ProductScheme, PurchaseStatus};

    fn setup() -> (Database, StorefrontConfig, String, String) {
        let db = Database::open_in_memory().unwrap();

        let client = ClientAccount::new("clinic@example.com".into(), "Clinic".into());
        db.insert_client(&client).unwrap();

        let scheme = ProductScheme::new("SKU001".into(), "CGM Sensor".into(), 49.99);
        db.upsert_scheme(&scheme).unwrap();

        let purchase = BulkPurchase::new(
            client.id.clone(),
            "order-1001".into(),
            "SKU001".into(),
            "CGM Sensor".into(),
            25,
        );
        db.insert_purchase(&purchase).unwrap();

        (db, StorefrontConfig::default(), client.id, purchase.id)
    }

    fn make_request(purchase_id: &str) -> CreateLinkRequest {
        CreateLinkRequest {
            bulk_purchase_id: purchase_id.to_string(),
            patient_email: Some("pat@example.com".into()),
            patient_name: Some("Pat Doe".into()),
            notes: None,
            max_uses: 1,
        }
    }

    #[test]
    fn test_create_link() {
        let (db, config, client_id, purchase_id) = setup();
        let issuer = LinkIssuer::new(&config);

        let link = issuer
            .create_link(&db, &client_id, &make_request(&purchase_id))
            .unwrap();

        assert_eq!(link.link_token.len(), 64);
        assert!(link.link_token.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(link.discount_code.starts_with("CARE-"));
        assert_eq!(link.custom_url, format!("patient/{}", link.link_token));
        assert_eq!(link.current_uses, 0);
        assert!(link.is_active);

        // Persisted and retrievable by token
        let stored = db.link_by_token(&link.link_token).unwrap().unwrap();
        assert_eq!(stored.id, link.id);

        // Issuance reserves nothing
        let purchase = db.purchase_by_id(&purchase_id).unwrap().unwrap();
        assert_eq!(purchase.quantity_remaining, 25);
    }

    #[test]
    fn test_discount_code_not_derived_from_token() {
        let (db, config, client_id, purchase_id) = setup();
        let issuer = LinkIssuer::new(&config);

        let link = issuer
            .create_link(&db, &client_id, &make_request(&purchase_id))
            .unwrap();
        let code_body = link.discount_code.strip_prefix("CARE-").unwrap();
        assert_eq!(code_body.len(), 16);
        assert!(!link.link_token.to_uppercase().contains(code_body));
    }

    #[test]
    fn test_tokens_unique_across_issuances() {
        let (db, config, client_id, purchase_id) = setup();
        let issuer = LinkIssuer::new(&config);

        let first = issuer
            .create_link(&db, &client_id, &make_request(&purchase_id))
            .unwrap();
        let second = issuer
            .create_link(&db, &client_id, &make_request(&purchase_id))
            .unwrap();
        assert_ne!(first.link_token, second.link_token);
        assert_ne!(first.discount_code, second.discount_code);
    }

    #[test]
    fn test_expiry_uses_validity_window() {
        let (db, config, client_id, purchase_id) = setup();
        let issuer = LinkIssuer::new(&config);

        let before = chrono::Utc::now() + chrono::Duration::days(29);
        let link = issuer
            .create_link(&db, &client_id, &make_request(&purchase_id))
            .unwrap();
        let expires_at =
            chrono::DateTime::parse_from_rfc3339(link.expires_at.as_deref().unwrap()).unwrap();
        assert!(expires_at.with_timezone(&chrono::Utc) > before);
    }

    #[test]
    fn test_foreign_purchase_reported_as_not_eligible() {
        let (db, config, _client_id, purchase_id) = setup();
        let issuer = LinkIssuer::new(&config);

        let outsider = ClientAccount::new("other@example.com".into(), "Other".into());
        db.insert_client(&outsider).unwrap();

        let result = issuer.create_link(&db, &outsider.id, &make_request(&purchase_id));
        assert!(matches!(result, Err(IssueError::NotEligible)));

        // Unknown purchase reads the same as a foreign one
        let result = issuer.create_link(&db, &outsider.id, &make_request("no-such-purchase"));
        assert!(matches!(result, Err(IssueError::NotEligible)));
    }

    #[test]
    fn test_drained_purchase_rejected() {
        let (db, config, client_id, purchase_id) = setup();
        let issuer = LinkIssuer::new(&config);

        db.conn()
            .execute(
                "UPDATE bulk_purchases SET quantity_remaining = 0 WHERE id = ?",
                [purchase_id.as_str()],
            )
            .unwrap();

        let result = issuer.create_link(&db, &client_id, &make_request(&purchase_id));
        assert!(matches!(result, Err(IssueError::NotEligible)));
    }

    #[test]
    fn test_non_active_purchase_rejected() {
        let (db, config, client_id, purchase_id) = setup();
        let issuer = LinkIssuer::new(&config);

        db.set_purchase_status(&purchase_id, PurchaseStatus::Expired)
            .unwrap();

        let result = issuer.create_link(&db, &client_id, &make_request(&purchase_id));
        assert!(matches!(result, Err(IssueError::NotEligible)));
    }

    #[test]
    fn test_zero_max_uses_rejected() {
        let (db, config, client_id, purchase_id) = setup();
        let issuer = LinkIssuer::new(&config);

        let mut request = make_request(&purchase_id);
        request.max_uses = 0;
        let result = issuer.create_link(&db, &client_id, &request);
        assert!(matches!(result, Err(IssueError::InvalidMaxUses)));
    }
}
