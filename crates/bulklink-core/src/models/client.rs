//! Client account models.

use serde::{Deserialize, Serialize};

/// Account role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientRole {
    /// Back-office operator; may run order syncs
    Admin,
    /// Clinic purchasing in bulk and issuing patient links
    Client,
}

/// A clinic (or admin) account owning bulk purchases.
///
/// Accounts are created by order ingestion when a bulk order arrives from a
/// contact email with no existing account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientAccount {
    /// Unique identifier
    pub id: String,
    /// Contact email - the ingestion key for this account
    pub email: String,
    /// Display name
    pub name: String,
    /// First name (from the order's customer record)
    pub first_name: Option<String>,
    /// Last name (from the order's customer record)
    pub last_name: Option<String>,
    /// Account role
    pub role: ClientRole,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl ClientAccount {
    /// Create a new client account with required fields.
    pub fn new(email: String, name: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            name,
            first_name: None,
            last_name: None,
            role: ClientRole::Client,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Check whether this account may run administrative operations.
    pub fn is_admin(&self) -> bool {
        self.role == ClientRole::Admin
    }
}
