//! Stripe Integration Module
//!
//! Everything the relay knows about its payment provider:
//!
//! - **Client**: [`StripeClient`], a `reqwest` client for the REST API
//! - **Provider seam**: [`BillingProvider`], one async method per remote call
//! - **Parameters**: fixed-shape request builders for checkout and portal sessions
//! - **Signature Verification**: HMAC-SHA256 validation of the `stripe-signature` header
//! - **Events**: the webhook envelope and the event kinds the relay logs
//!
//! # Architecture
//!
//! ```text
//! handler ──> BillingProvider ──> StripeClient ──> api.stripe.com
//!
//! /webhook ──> SignatureVerifier ──> WebhookEvent ──> log line
//! ```
//!
//! # Security
//!
//! - Secret key and webhook secret never appear in `Debug` output or logs
//! - Constant-time signature comparison
//! - Verification runs over the raw body captured before any JSON parsing

pub mod client;
pub mod error;
pub mod events;
pub mod params;
pub mod provider;
pub mod signature;

// Re-export commonly used items
pub use client::StripeClient;
pub use error::{StripeError, StripeResult, WebhookError};
pub use events::{EventKind, WebhookEvent};
pub use params::{
    CheckoutSessionParams, CreatedCheckoutSession, CreatedPortalSession, PortalSessionParams,
};
pub use provider::BillingProvider;
pub use signature::SignatureVerifier;
