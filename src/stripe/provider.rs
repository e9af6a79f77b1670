//! The seam between the HTTP routes and the payment provider.

use serde_json::Value;

use crate::stripe::error::StripeResult;
use crate::stripe::params::{
    CheckoutSessionParams, CreatedCheckoutSession, CreatedPortalSession, PortalSessionParams,
};

/// One method per remote billing operation.
///
/// Implementations perform exactly one round-trip per call and never cache.
/// Retrievals return the provider's object untouched so routes can relay it
/// verbatim.
#[async_trait::async_trait]
pub trait BillingProvider: Send + Sync + 'static {
    /// `GET /v1/checkout/sessions/{id}`
    async fn retrieve_checkout_session(&self, session_id: &str) -> StripeResult<Value>;

    /// `POST /v1/checkout/sessions`
    async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams,
    ) -> StripeResult<CreatedCheckoutSession>;

    /// `DELETE /v1/subscriptions/{id}`
    async fn cancel_subscription(&self, subscription_id: &str) -> StripeResult<Value>;

    /// `GET /v1/subscriptions/{id}`
    async fn retrieve_subscription(&self, subscription_id: &str) -> StripeResult<Value>;

    /// `GET /v1/customers/{id}`
    async fn retrieve_customer(&self, customer_id: &str) -> StripeResult<Value>;

    /// `POST /v1/billing_portal/sessions`
    async fn create_portal_session(
        &self,
        params: &PortalSessionParams,
    ) -> StripeResult<CreatedPortalSession>;
}
