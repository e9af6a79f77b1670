//! Request parameters and creation results for the provider calls.
//!
//! Stripe takes `application/x-www-form-urlencoded` bodies with bracketed
//! keys for nested fields, so each parameter struct renders itself into an
//! ordered list of form pairs.

use serde::{Deserialize, Serialize};

/// Placeholder Stripe substitutes with the new session ID on redirect
pub const CHECKOUT_SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Client reference attached to every checkout session unless overridden
pub const DEFAULT_CLIENT_REFERENCE_ID: &str = "blackjackptit";

/// A subscription-mode checkout session for a single price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSessionParams {
    /// Price reference (`price_...`)
    pub price_id: String,
    /// Tag echoed back on the session and in webhooks
    pub client_reference_id: String,
    /// Where Stripe sends the customer after paying
    pub success_url: String,
    /// Where Stripe sends the customer after backing out
    pub cancel_url: String,
}

impl CheckoutSessionParams {
    /// Build the fixed-shape subscription request for `price_id`.
    ///
    /// Redirect URLs hang off `domain`; the success URL carries the
    /// session ID placeholder so the success page can look the session up.
    pub fn subscription(
        price_id: impl Into<String>,
        domain: &str,
        client_reference_id: impl Into<String>,
    ) -> Self {
        let domain = domain.trim_end_matches('/');
        Self {
            price_id: price_id.into(),
            client_reference_id: client_reference_id.into(),
            success_url: format!(
                "{domain}/success.html?session_id={CHECKOUT_SESSION_ID_PLACEHOLDER}"
            ),
            cancel_url: format!("{domain}/canceled.html"),
        }
    }

    /// Form pairs for `POST /v1/checkout/sessions`
    pub fn to_form(&self) -> Vec<(&'static str, String)> {
        vec![
            ("mode", "subscription".to_string()),
            ("payment_method_types[0]", "card".to_string()),
            ("client_reference_id", self.client_reference_id.clone()),
            ("line_items[0][price]", self.price_id.clone()),
            ("line_items[0][quantity]", "1".to_string()),
            ("success_url", self.success_url.clone()),
            ("cancel_url", self.cancel_url.clone()),
        ]
    }
}

/// A billing-portal session for an existing customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalSessionParams {
    /// Customer reference (`cus_...`)
    pub customer_id: String,
    /// Where the portal sends the customer when they are done
    pub return_url: String,
}

impl PortalSessionParams {
    /// Portal session returning to `return_url`
    pub fn new(customer_id: impl Into<String>, return_url: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            return_url: return_url.into(),
        }
    }

    /// Form pairs for `POST /v1/billing_portal/sessions`
    pub fn to_form(&self) -> Vec<(&'static str, String)> {
        vec![
            ("customer", self.customer_id.clone()),
            ("return_url", self.return_url.clone()),
        ]
    }
}

/// The part of a created checkout session the relay hands back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedCheckoutSession {
    /// Session ID (`cs_...`)
    pub id: String,
}

/// The part of a created portal session the relay hands back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPortalSession {
    /// Hosted portal URL
    pub url: String,
}
