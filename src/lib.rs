//! Billing Relay - Subscription Billing Backend for Stripe
//!
//! This crate provides a small HTTP backend that forwards subscription billing
//! operations to Stripe and relays Stripe's webhook events to the logs.
//!
//! # Features
//!
//! - **Checkout**: create subscription checkout sessions and look them up
//! - **Subscriptions & Customers**: retrieve or cancel by reference
//! - **Billing Portal**: open a hosted self-service portal session
//! - **Webhooks**: signature-verified event ingestion over the raw body
//! - **Static Pages**: serves the checkout front end from a directory
//!
//! # Architecture
//!
//! ```text
//! Browser ──▶ Axum Router ──▶ BillingProvider ──▶ Stripe REST API
//!                  │
//!                  ▼
//!   Stripe ──▶ /webhook ──▶ SignatureVerifier ──▶ tracing
//! ```
//!
//! No billing state is held locally: every read is a live round-trip and
//! every create or delete returns Stripe's own answer.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use billing_relay::{app_router, AppState};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = app_router(Arc::new(AppState::from_env()?));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:4242").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod cors;
pub mod error;
pub mod handlers;
pub mod raw_body;
pub mod stripe;

// Re-exports for convenience
pub use config::{BillingConfig, ConfigError, SetupInfo};
pub use error::{ApiError, Error, Result};
pub use handlers::{app_router, AppState};
pub use stripe::{BillingProvider, StripeClient, StripeError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
