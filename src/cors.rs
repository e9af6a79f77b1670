//! CORS policy for the billing routes.
//!
//! The checkout page is normally served from the relay itself, so most
//! requests are same-origin. When the page lives elsewhere, only the origin
//! of the configured `DOMAIN` may call the JSON routes.
//!
//! - **Allowed Origins**: the `DOMAIN` origin only
//! - **Allowed Methods**: GET, POST, OPTIONS
//! - **Allowed Headers**: Content-Type, Stripe-Signature
//! - **Max Age**: 3600 seconds

use std::time::Duration;

use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::Method;
use tower_http::cors::{AllowOrigin, CorsLayer};
use url::Url;

/// Allowed request headers
pub const ALLOWED_HEADERS: [HeaderName; 2] =
    [CONTENT_TYPE, HeaderName::from_static("stripe-signature")];

/// Allowed methods
pub const ALLOWED_METHODS: [Method; 3] = [Method::GET, Method::POST, Method::OPTIONS];

/// Default max age for preflight cache (1 hour)
pub const DEFAULT_MAX_AGE_SECS: u64 = 3600;

/// CORS configuration options.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Serialized origin (`scheme://host[:port]`) allowed to call the API
    pub allowed_origin: Option<String>,
    /// Maximum age for preflight cache in seconds
    pub max_age_secs: u64,
}

impl CorsConfig {
    /// Policy for pages served from `domain`.
    ///
    /// An unparsable domain allows no cross-origin callers at all.
    pub fn for_domain(domain: &str) -> Self {
        let allowed_origin = Url::parse(domain)
            .ok()
            .map(|url| url.origin().ascii_serialization())
            .filter(|origin| origin != "null");

        Self {
            allowed_origin,
            max_age_secs: DEFAULT_MAX_AGE_SECS,
        }
    }

    /// Whether an `Origin` header value passes this policy.
    pub fn is_allowed(&self, origin: &HeaderValue) -> bool {
        let Ok(origin) = origin.to_str() else {
            return false;
        };

        self.allowed_origin
            .as_deref()
            .is_some_and(|allowed| allowed.eq_ignore_ascii_case(origin))
    }
}

/// Build the tower-http layer for `config`.
pub fn cors_layer(config: CorsConfig) -> CorsLayer {
    let max_age = Duration::from_secs(config.max_age_secs);

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            config.is_allowed(origin)
        }))
        .allow_methods(ALLOWED_METHODS)
        .allow_headers(ALLOWED_HEADERS)
        .max_age(max_age)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_origin_allowed() {
        let config = CorsConfig::for_domain("https://billing.example.com/");
        assert_eq!(
            config.allowed_origin.as_deref(),
            Some("https://billing.example.com")
        );
        assert!(config.is_allowed(&HeaderValue::from_static("https://billing.example.com")));
    }

    #[test]
    fn test_domain_port_is_part_of_origin() {
        let config = CorsConfig::for_domain("http://localhost:4242");
        assert!(config.is_allowed(&HeaderValue::from_static("http://localhost:4242")));
        assert!(!config.is_allowed(&HeaderValue::from_static("http://localhost:3000")));
    }

    #[test]
    fn test_other_origins_blocked() {
        let config = CorsConfig::for_domain("https://billing.example.com");
        assert!(!config.is_allowed(&HeaderValue::from_static("https://evil.com")));
        assert!(!config.is_allowed(&HeaderValue::from_static(
            "https://billing.example.com.evil.com"
        )));
        assert!(!config.is_allowed(&HeaderValue::from_static("http://billing.example.com")));
    }

    #[test]
    fn test_unparsable_domain_allows_nothing() {
        let config = CorsConfig::for_domain("not a url");
        assert!(config.allowed_origin.is_none());
        assert!(!config.is_allowed(&HeaderValue::from_static("http://localhost")));
    }

    #[test]
    fn test_cors_layer_creation() {
        let config = CorsConfig::for_domain("http://localhost:4242");
        assert_eq!(config.max_age_secs, DEFAULT_MAX_AGE_SECS);
        let _ = format!("{:?}", cors_layer(config));
    }
}
