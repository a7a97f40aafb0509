//! Bulklink Core Library
//!
//! Connects bulk product purchasers (clinics) to individual patients through
//! limited-use discount links, backed by an external storefront.
//!
//! # Architecture
//!
//! ```text
//! Storefront orders ──► Order Ingestion ──► BulkPurchase ledger
//!                                                │
//!                                        Link Issuer (no reservation)
//!                                                │
//!                                          PatientLink
//!                                                │
//!                        Patient ──► Link Validator (read)
//!                                                │
//!                                ┌───────────────▼───────────────┐
//!                                │       Redemption Engine       │
//!                                │  one transaction:             │
//!                                │   insert fulfillment          │
//!                                │   current_uses += 1 (guarded) │
//!                                │   remaining -= qty  (guarded) │
//!                                └───────────────┬───────────────┘
//!                                                │
//!                                      checkout reference
//! ```
//!
//! # Core Principle
//!
//! **The remaining balance never goes negative.** Issuance reserves nothing;
//! redemption settles first-come-first-served, and both conditional updates
//! must apply or the whole attempt rolls back.
//!
//! # Modules
//!
//! - [`db`]: SQLite database layer and the conditional-update guards
//! - [`models`]: Domain types (BulkPurchase, PatientLink, etc.)
//! - [`links`]: Link issuance and pure validity evaluation
//! - [`redeem`]: The atomic redemption engine and checkout references
//! - [`ingest`]: Idempotent order sync and the catalog boundary
//! - [`api`]: Request/response facade with status-code mapping

pub mod api;
pub mod config;
pub mod db;
pub mod ingest;
pub mod links;
pub mod models;
pub mod redeem;

// Re-export commonly used types
pub use api::{ApiError, AppService, LinkStatusResponse, RedemptionResponse};
pub use config::StorefrontConfig;
pub use db::{ConditionalUpdate, Database};
pub use ingest::{BulkOrderPredicate, CatalogClient, NullCatalog, OrderIngestor, SyncReport};
pub use links::{CreateLinkRequest, IssueError, LinkIssuer, LinkValidity};
pub use models::{
    BulkPurchase, ClientAccount, ExternalOrder, OrderLineItem, PatientFulfillment, PatientLink,
    ProductScheme, PurchaseStatus, RequestMeta,
};
pub use redeem::{FulfillmentOutcome, RedeemError, RedeemRequest, RedemptionEngine};
