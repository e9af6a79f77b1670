//! Runtime configuration.
//!
//! Everything comes from environment variables (optionally seeded from a
//! `.env` file by the binary). The configuration is built once at startup and
//! shared read-only by every request.
//!
//! | Variable | Required | Meaning |
//! |---|---|---|
//! | `STATIC_DIR` | no (`.`) | Directory holding `index.html` and the redirect pages |
//! | `DOMAIN` | yes | Public base URL used for checkout and portal redirects |
//! | `STRIPE_SECRET_KEY` | yes | Secret API key |
//! | `STRIPE_PUBLISHABLE_KEY` | yes | Publishable key handed to the browser |
//! | `BASIC_PRICE_ID` / `PRO_PRICE_ID` | yes | Price references offered on the page |
//! | `STRIPE_WEBHOOK_SECRET` | no | Enables webhook signature verification |
//! | `STRIPE_API_BASE` | no | Alternate API host |
//! | `STRIPE_API_VERSION` | no | Pinned `Stripe-Version` header |
//! | `CLIENT_REFERENCE_ID` | no | Tag attached to checkout sessions |
//! | `WEBHOOK_TOLERANCE_SECS` | no (300) | Allowed signature age |

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::stripe::params::DEFAULT_CLIENT_REFERENCE_ID;
use crate::stripe::signature::{SignatureVerifier, DEFAULT_TOLERANCE_SECS};

/// Configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Required variable missing or empty
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    /// Variable present but unusable
    #[error("Invalid value for {name}: {reason}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Result type for configuration loading
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Values returned by `GET /setup`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupInfo {
    /// Publishable key for the browser SDK
    pub publishable_key: String,
    /// Basic plan price reference
    pub basic_price: String,
    /// Pro plan price reference
    pub pro_price: String,
}

/// Billing relay configuration
#[derive(Clone)]
pub struct BillingConfig {
    /// Directory served as static content
    pub static_dir: PathBuf,
    /// Public base URL, no trailing slash
    pub domain: String,
    secret_key: String,
    /// Publishable key and plan prices
    pub setup: SetupInfo,
    webhook_secret: Option<String>,
    /// Alternate API host
    pub api_base: Option<Url>,
    /// Pinned API version
    pub api_version: Option<String>,
    /// Tag attached to every checkout session
    pub client_reference_id: String,
    /// Allowed webhook signature age in seconds
    pub webhook_tolerance_secs: i64,
}

impl std::fmt::Debug for BillingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingConfig")
            .field("static_dir", &self.static_dir)
            .field("domain", &self.domain)
            .field("secret_key", &"<redacted>")
            .field("setup", &self.setup)
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("api_base", &self.api_base.as_ref().map(Url::as_str))
            .field("api_version", &self.api_version)
            .field("client_reference_id", &self.client_reference_id)
            .field("webhook_tolerance_secs", &self.webhook_tolerance_secs)
            .finish()
    }
}

impl BillingConfig {
    /// Load from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from any name → value source.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));

        let domain = required("DOMAIN")?;
        let parsed = Url::parse(&domain).map_err(|e| ConfigError::Invalid {
            name: "DOMAIN",
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                name: "DOMAIN",
                reason: format!("unsupported scheme {:?}", parsed.scheme()),
            });
        }

        let api_base = optional("STRIPE_API_BASE")
            .map(|raw| {
                Url::parse(&raw).map_err(|e| ConfigError::Invalid {
                    name: "STRIPE_API_BASE",
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let webhook_tolerance_secs = match optional("WEBHOOK_TOLERANCE_SECS") {
            Some(raw) => raw.parse::<i64>().map_err(|e| ConfigError::Invalid {
                name: "WEBHOOK_TOLERANCE_SECS",
                reason: e.to_string(),
            })?,
            None => DEFAULT_TOLERANCE_SECS,
        };
        if webhook_tolerance_secs < 0 {
            return Err(ConfigError::Invalid {
                name: "WEBHOOK_TOLERANCE_SECS",
                reason: "must not be negative".to_string(),
            });
        }

        Ok(Self {
            static_dir: PathBuf::from(optional("STATIC_DIR").unwrap_or_else(|| ".".to_string())),
            domain: domain.trim_end_matches('/').to_string(),
            secret_key: required("STRIPE_SECRET_KEY")?,
            setup: SetupInfo {
                publishable_key: required("STRIPE_PUBLISHABLE_KEY")?,
                basic_price: required("BASIC_PRICE_ID")?,
                pro_price: required("PRO_PRICE_ID")?,
            },
            webhook_secret: optional("STRIPE_WEBHOOK_SECRET"),
            api_base,
            api_version: optional("STRIPE_API_VERSION"),
            client_reference_id: optional("CLIENT_REFERENCE_ID")
                .unwrap_or_else(|| DEFAULT_CLIENT_REFERENCE_ID.to_string()),
            webhook_tolerance_secs,
        })
    }

    /// Secret API key
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    /// Whether webhook deliveries must be signed
    pub fn webhook_signing_enabled(&self) -> bool {
        self.webhook_secret.is_some()
    }

    /// Verifier for webhook signatures, when a secret is configured
    pub fn signature_verifier(&self) -> Option<SignatureVerifier> {
        self.webhook_secret
            .as_ref()
            .map(|secret| SignatureVerifier::new(secret).with_tolerance(self.webhook_tolerance_secs))
    }

    /// Replace the webhook secret
    pub fn with_webhook_secret(mut self, secret: Option<String>) -> Self {
        self.webhook_secret = secret.filter(|s| !s.is_empty());
        self
    }

    /// Configuration with fixed test values and signing disabled
    pub fn test_config() -> Self {
        Self {
            static_dir: PathBuf::from("."),
            domain: "http://localhost:4242".to_string(),
            secret_key: "sk_test_123".to_string(),
            setup: SetupInfo {
                publishable_key: "pk_test_123".to_string(),
                basic_price: "price_basic".to_string(),
                pro_price: "price_pro".to_string(),
            },
            webhook_secret: None,
            api_base: None,
            api_version: None,
            client_reference_id: DEFAULT_CLIENT_REFERENCE_ID.to_string(),
            webhook_tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }
}
