//! Patient link issuance and validity evaluation.

mod issuer;
mod validity;

pub use issuer::*;
pub use validity::*;
