//! HTTP surface of the billing relay.
//!
//! ```text
//! HTTP Request ──> capture_raw_body ──> Axum Router ──> handler ──> BillingProvider
//!                  (/webhook only)          │                            │
//!                                           ▼                            ▼
//!                                    static files               Stripe REST API
//! ```
//!
//! # Routes
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | GET | `/` | `index.html` from the static directory |
//! | GET | `/checkout-session` | [`billing::checkout_session_handler`] |
//! | POST | `/create-checkout-session` | [`billing::create_checkout_session_handler`] |
//! | GET | `/cancel-subscription` | [`billing::cancel_subscription_handler`] |
//! | GET | `/subscription` | [`billing::subscription_handler`] |
//! | GET | `/customer` | [`billing::customer_handler`] |
//! | GET | `/setup` | [`billing::setup_handler`] |
//! | POST | `/customer-portal` | [`billing::customer_portal_handler`] |
//! | POST | `/webhook` | [`webhook::webhook_handler`] |
//! | GET | `/health` | [`status::health_handler`] |
//!
//! Anything else is looked up under the static directory.

pub mod billing;
pub mod status;
pub mod webhook;

use std::sync::Arc;

use axum::routing::{get, get_service, post};
use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

use crate::config::BillingConfig;
use crate::cors::{cors_layer, CorsConfig};
use crate::error::Result;
use crate::raw_body::capture_raw_body;
use crate::stripe::client::StripeClient;
use crate::stripe::provider::BillingProvider;
use crate::stripe::signature::SignatureVerifier;

pub use billing::{CheckoutSessionResponse, CustomerPortalResponse};
pub use status::{health_handler, HealthResponse};
pub use webhook::webhook_handler;

/// Shared, read-only state handed to every handler.
pub struct AppState {
    /// Startup configuration
    pub config: Arc<BillingConfig>,
    /// Remote billing provider
    pub provider: Arc<dyn BillingProvider>,
    /// Webhook verifier, present when a signing secret is configured
    pub verifier: Option<SignatureVerifier>,
}

impl AppState {
    /// Bundle configuration and provider.
    pub fn new(config: BillingConfig, provider: Arc<dyn BillingProvider>) -> Self {
        let verifier = config.signature_verifier();
        Self {
            config: Arc::new(config),
            provider,
            verifier,
        }
    }

    /// State backed by a live [`StripeClient`] built from `config`.
    ///
    /// Honors the `STRIPE_API_BASE` and `STRIPE_API_VERSION` overrides.
    pub fn from_config(config: BillingConfig) -> Result<Self> {
        let client = StripeClient::new(config.secret_key())?
            .with_api_version(config.api_version.clone());
        let client = match &config.api_base {
            Some(base) => client.with_base_url(base.clone()),
            None => client,
        };

        Ok(Self::new(config, Arc::new(client)))
    }

    /// Load configuration from the process environment and build live state.
    pub fn from_env() -> Result<Self> {
        Self::from_config(BillingConfig::from_env()?)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("webhook_signing", &self.verifier.is_some())
            .finish_non_exhaustive()
    }
}

/// Build the complete application router.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use billing_relay::handlers::{app_router, AppState};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let app = app_router(Arc::new(AppState::from_env()?));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:4242").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn app_router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();
    let cors = cors_layer(CorsConfig::for_domain(&state.config.domain));

    Router::new()
        .route(
            "/",
            get_service(ServeFile::new(static_dir.join("index.html"))),
        )
        .route("/checkout-session", get(billing::checkout_session_handler))
        .route(
            "/create-checkout-session",
            post(billing::create_checkout_session_handler),
        )
        .route(
            "/cancel-subscription",
            get(billing::cancel_subscription_handler),
        )
        .route("/subscription", get(billing::subscription_handler))
        .route("/customer", get(billing::customer_handler))
        .route("/setup", get(billing::setup_handler))
        .route("/customer-portal", post(billing::customer_portal_handler))
        .route("/webhook", post(webhook::webhook_handler))
        .route("/health", get(status::health_handler))
        .fallback_service(ServeDir::new(static_dir))
        .layer(axum::middleware::from_fn(capture_raw_body))
        .layer(cors)
        .with_state(state)
}
