//! Environment-derived storefront configuration.

/// Storefront and issuance configuration.
///
/// The store URL and access token belong to the external storefront
/// collaborator; they are required inputs for checkout-reference
/// construction but carry no correctness contract of their own.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Storefront host, e.g. `example-partner.myshopify.com`
    pub store_url: Option<String>,
    /// Storefront API credential
    pub access_token: Option<String>,
    /// Prefix for issued discount codes
    pub discount_prefix: String,
    /// Link validity window in days
    pub link_validity_days: i64,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            store_url: None,
            access_token: None,
            discount_prefix: "CARE".into(),
            link_validity_days: 30,
        }
    }
}

impl StorefrontConfig {
    /// Read configuration from the environment.
    ///
    /// `SHOPIFY_STORE_URL` and `SHOPIFY_ACCESS_TOKEN` are optional;
    /// `DISCOUNT_CODE_PREFIX` and `LINK_VALIDITY_DAYS` fall back to the
    /// defaults when absent or malformed.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            store_url: std::env::var("SHOPIFY_STORE_URL").ok().filter(|v| !v.is_empty()),
            access_token: std::env::var("SHOPIFY_ACCESS_TOKEN")
                .ok()
                .filter(|v| !v.is_empty()),
            discount_prefix: std::env::var("DISCOUNT_CODE_PREFIX")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.discount_prefix),
            link_validity_days: std::env::var("LINK_VALIDITY_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.link_validity_days),
        }
    }

    /// Fully-qualified storefront base URL.
    pub fn base_url(&self) -> Option<String> {
        self.store_url.as_ref().map(|url| {
            if url.starts_with("http://") || url.starts_with("https://") {
                url.clone()
            } else {
                format!("https://{}", url)
            }
        })
    }

    /// Validity window applied to newly issued links.
    pub fn link_validity(&self) -> chrono::Duration {
        chrono::Duration::days(self.link_validity_days)
    }
}
