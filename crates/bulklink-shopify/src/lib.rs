//! Shopify storefront boundary for bulklink.
//!
//! Transport stays with the caller: sync payloads arrive as JSON documents
//! (the admin surface forwards the storefront's REST responses), and this
//! crate turns them into the storefront-neutral records `bulklink-core`
//! ingests. It also provides a [`CatalogClient`] implementation backed by
//! preloaded product payloads.
//!
//! [`CatalogClient`]: bulklink_core::CatalogClient

pub mod catalog;
pub mod orders;
pub mod wire;

pub use catalog::*;
pub use orders::*;
pub use wire::*;
