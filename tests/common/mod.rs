//! Shared helpers for the integration tests.
//!
//! [`FakeProvider`] stands in for Stripe: it remembers the sessions it
//! created and the subscriptions it canceled, and answers unknown references
//! with the same error envelope shape Stripe uses.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::http::{Request, Response};
use axum::Router;
use billing_relay::stripe::{
    BillingProvider, CheckoutSessionParams, CreatedCheckoutSession, CreatedPortalSession,
    PortalSessionParams, StripeError, StripeResult,
};
use billing_relay::{app_router, AppState, BillingConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Prices the fake provider accepts
pub const KNOWN_PRICES: [&str; 3] = ["price_123", "price_basic", "price_pro"];

/// Session ID handed out for the first checkout session
pub const FIRST_SESSION_ID: &str = "cs_test_abc";

#[derive(Debug, Default)]
struct Ledger {
    sessions: HashMap<String, CheckoutSessionParams>,
    canceled: HashSet<String>,
    portal_requests: Vec<PortalSessionParams>,
    calls: usize,
}

/// In-memory provider double.
#[derive(Debug, Clone, Default)]
pub struct FakeProvider {
    ledger: Arc<Mutex<Ledger>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of provider calls made so far
    pub fn calls(&self) -> usize {
        self.ledger.lock().unwrap().calls
    }

    /// Parameters of a created session
    pub fn session(&self, id: &str) -> Option<CheckoutSessionParams> {
        self.ledger.lock().unwrap().sessions.get(id).cloned()
    }

    /// Portal sessions requested so far
    pub fn portal_requests(&self) -> Vec<PortalSessionParams> {
        self.ledger.lock().unwrap().portal_requests.clone()
    }

    fn record_call(&self) -> std::sync::MutexGuard<'_, Ledger> {
        let mut ledger = self.ledger.lock().unwrap();
        ledger.calls += 1;
        ledger
    }
}

fn missing(kind: &str, id: &str) -> StripeError {
    StripeError::Api {
        status: 404,
        error_type: Some("invalid_request_error".to_string()),
        code: Some("resource_missing".to_string()),
        message: format!("No such {kind}: '{id}'"),
    }
}

#[async_trait::async_trait]
impl BillingProvider for FakeProvider {
    async fn retrieve_checkout_session(&self, session_id: &str) -> StripeResult<Value> {
        let ledger = self.record_call();
        let params = ledger
            .sessions
            .get(session_id)
            .ok_or_else(|| missing("checkout.session", session_id))?;

        Ok(json!({
            "id": session_id,
            "object": "checkout.session",
            "mode": "subscription",
            "payment_status": "unpaid",
            "client_reference_id": params.client_reference_id,
            "success_url": params.success_url,
            "cancel_url": params.cancel_url,
            "line_items": { "data": [{ "price": { "id": params.price_id }, "quantity": 1 }] },
        }))
    }

    async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams,
    ) -> StripeResult<CreatedCheckoutSession> {
        let mut ledger = self.record_call();
        if !KNOWN_PRICES.contains(&params.price_id.as_str()) {
            return Err(StripeError::Api {
                status: 400,
                error_type: Some("invalid_request_error".to_string()),
                code: Some("resource_missing".to_string()),
                message: format!("No such price: '{}'", params.price_id),
            });
        }

        let id = if ledger.sessions.is_empty() {
            FIRST_SESSION_ID.to_string()
        } else {
            format!("cs_test_{}", ledger.sessions.len())
        };
        ledger.sessions.insert(id.clone(), params.clone());
        Ok(CreatedCheckoutSession { id })
    }

    async fn cancel_subscription(&self, subscription_id: &str) -> StripeResult<Value> {
        let mut ledger = self.record_call();
        if !subscription_id.starts_with("sub_") || !ledger.canceled.insert(subscription_id.to_string())
        {
            return Err(missing("subscription", subscription_id));
        }

        Ok(json!({
            "id": subscription_id,
            "object": "subscription",
            "status": "canceled",
        }))
    }

    async fn retrieve_subscription(&self, subscription_id: &str) -> StripeResult<Value> {
        let ledger = self.record_call();
        if !subscription_id.starts_with("sub_") {
            return Err(missing("subscription", subscription_id));
        }

        let status = if ledger.canceled.contains(subscription_id) {
            "canceled"
        } else {
            "active"
        };
        Ok(json!({ "id": subscription_id, "object": "subscription", "status": status }))
    }

    async fn retrieve_customer(&self, customer_id: &str) -> StripeResult<Value> {
        let _ledger = self.record_call();
        if !customer_id.starts_with("cus_") {
            return Err(missing("customer", customer_id));
        }

        Ok(json!({ "id": customer_id, "object": "customer", "email": "jenny@example.com" }))
    }

    async fn create_portal_session(
        &self,
        params: &PortalSessionParams,
    ) -> StripeResult<CreatedPortalSession> {
        let mut ledger = self.record_call();
        if !params.customer_id.starts_with("cus_") {
            return Err(missing("customer", &params.customer_id));
        }

        ledger.portal_requests.push(params.clone());
        Ok(CreatedPortalSession {
            url: format!("https://billing.stripe.com/p/session/{}", params.customer_id),
        })
    }
}

/// Router over `config` with a fresh fake provider
pub fn test_app(config: BillingConfig) -> (Router, FakeProvider) {
    let provider = FakeProvider::new();
    let state = AppState::new(config, Arc::new(provider.clone()));
    (app_router(Arc::new(state)), provider)
}

/// Run one request through the router
pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
