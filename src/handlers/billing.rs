//! Billing routes.
//!
//! Each handler validates its one input, makes exactly one provider call and
//! relays the result. Nothing is cached and nothing is retried.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use crate::config::SetupInfo;
use crate::error::ApiError;
use crate::handlers::AppState;
use crate::stripe::params::{CheckoutSessionParams, PortalSessionParams};

/// `?sessionId=`
#[derive(Debug, Default, Deserialize)]
pub struct SessionQuery {
    /// Checkout session reference
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// `?subscriptionId=`
#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionQuery {
    /// Subscription reference
    #[serde(rename = "subscriptionId")]
    pub subscription_id: Option<String>,
}

/// `?customerId=`
#[derive(Debug, Default, Deserialize)]
pub struct CustomerQuery {
    /// Customer reference
    #[serde(rename = "customerId")]
    pub customer_id: Option<String>,
}

/// Body of `POST /create-checkout-session`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSessionRequest {
    /// Price the customer picked
    pub price_id: Option<String>,
}

/// Response of `POST /create-checkout-session`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionResponse {
    /// New session reference
    pub session_id: String,
}

/// Body of `POST /customer-portal`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPortalRequest {
    /// Customer opening the portal
    pub customer_id: Option<String>,
}

/// Response of `POST /customer-portal`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPortalResponse {
    /// Hosted portal URL to redirect to
    pub url: String,
}

/// Blank counts as missing; any other value is forwarded untouched.
fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::missing_param(name))
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

/// `GET /checkout-session?sessionId=`
#[instrument(skip(state))]
pub async fn checkout_session_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<Value>, ApiError> {
    let session_id = required(query.session_id, "sessionId")?;

    state
        .provider
        .retrieve_checkout_session(&session_id)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_provider(&e))
}

/// `POST /create-checkout-session`
///
/// Any provider failure, an unknown price included, is a 400.
#[instrument(skip_all)]
pub async fn create_checkout_session_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateCheckoutSessionRequest>, JsonRejection>,
) -> Result<Json<CheckoutSessionResponse>, ApiError> {
    let request = json_body(payload)?;
    let price_id = required(request.price_id, "priceId")?;

    let params = CheckoutSessionParams::subscription(
        price_id,
        &state.config.domain,
        state.config.client_reference_id.clone(),
    );

    let session = state
        .provider
        .create_checkout_session(&params)
        .await
        .map_err(|e| ApiError::from_provider_as_bad_request(&e))?;

    info!(session_id = %session.id, price_id = %params.price_id, "Checkout session created");

    Ok(Json(CheckoutSessionResponse {
        session_id: session.id,
    }))
}

/// `GET /cancel-subscription?subscriptionId=`
///
/// Not idempotent: a second call reports whatever Stripe says about the
/// already-canceled subscription.
#[instrument(skip(state))]
pub async fn cancel_subscription_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SubscriptionQuery>,
) -> Result<Json<Value>, ApiError> {
    let subscription_id = required(query.subscription_id, "subscriptionId")?;

    let deleted = state
        .provider
        .cancel_subscription(&subscription_id)
        .await
        .map_err(|e| ApiError::from_provider(&e))?;

    info!(subscription_id = %subscription_id, "Subscription canceled");
    Ok(Json(deleted))
}

/// `GET /subscription?subscriptionId=`
#[instrument(skip(state))]
pub async fn subscription_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SubscriptionQuery>,
) -> Result<Json<Value>, ApiError> {
    let subscription_id = required(query.subscription_id, "subscriptionId")?;

    state
        .provider
        .retrieve_subscription(&subscription_id)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_provider(&e))
}

/// `GET /customer?customerId=`
#[instrument(skip(state))]
pub async fn customer_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CustomerQuery>,
) -> Result<Json<Value>, ApiError> {
    let customer_id = required(query.customer_id, "customerId")?;

    state
        .provider
        .retrieve_customer(&customer_id)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_provider(&e))
}

/// `GET /setup`
///
/// Built from configuration only; no provider call.
#[instrument(skip_all)]
pub async fn setup_handler(State(state): State<Arc<AppState>>) -> Json<SetupInfo> {
    Json(state.config.setup.clone())
}

/// `POST /customer-portal`
///
/// The portal returns the customer to the configured domain.
#[instrument(skip_all)]
pub async fn customer_portal_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CustomerPortalRequest>, JsonRejection>,
) -> Result<Json<CustomerPortalResponse>, ApiError> {
    let request = json_body(payload)?;
    let customer_id = required(request.customer_id, "customerId")?;

    let params = PortalSessionParams::new(customer_id, state.config.domain.clone());
    let session = state
        .provider
        .create_portal_session(&params)
        .await
        .map_err(|e| ApiError::from_provider(&e))?;

    Ok(Json(CustomerPortalResponse { url: session.url }))
}
