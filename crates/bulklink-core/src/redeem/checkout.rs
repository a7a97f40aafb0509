//! Checkout reference construction.
//!
//! Pure string composition over the storefront configuration; deliberately
//! outside the redemption transaction.

use crate::config::StorefrontConfig;
use crate::models::ProductScheme;

/// Build the storefront checkout URL for a redeemed link.
///
/// Prefers the cart deep-link when a variant id is known, falls back to the
/// product page, and yields `None` when the storefront is unconfigured or
/// the scheme carries no product id.
pub fn checkout_reference(
    config: &StorefrontConfig,
    scheme: &ProductScheme,
    discount_code: &str,
) -> Option<String> {
    let base_url = config.base_url()?;
    let product_id = scheme.product_id.as_deref()?;

    match scheme.variant_id.as_deref() {
        Some(variant_id) => Some(format!(
            "{}/cart/{}:{}?discount={}",
            base_url, variant_id, scheme.max_units_per_link, discount_code
        )),
        None => Some(format!(
            "{}/products/{}?discount={}",
            base_url, product_id, discount_code
        )),
    }
}
