//! Order ingestion: turns external bulk orders into ledger entries.

mod catalog;
mod sync;

pub use catalog::*;
pub use sync::*;
