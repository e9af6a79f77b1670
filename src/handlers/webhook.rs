//! Webhook ingestion.
//!
//! ```text
//! POST /webhook
//!     |
//!     v
//! [secret configured?] --no--> parse raw body
//!     | yes                          |
//!     v                              |
//! [verify stripe-signature] --fail--> 400
//!     | ok                           |
//!     v                              v
//! parse raw body ----------------> log type tag --> 200
//! ```
//!
//! Nothing outlives the request. Unknown event types are acknowledged like
//! any other; a bad signature is the only way to get a 400 from a
//! well-formed delivery.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Extension;
use tracing::{debug, info, instrument, warn};

use crate::handlers::AppState;
use crate::raw_body::RawBody;
use crate::stripe::error::WebhookError;
use crate::stripe::events::{EventKind, WebhookEvent};
use crate::stripe::signature::SignatureVerifier;

/// Header Stripe puts the signature in
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// `POST /webhook`
#[instrument(skip_all)]
pub async fn webhook_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    raw: Option<Extension<RawBody>>,
) -> StatusCode {
    let raw = raw.map(|Extension(raw)| raw);

    match receive_event(state.verifier.as_ref(), &headers, raw.as_ref()) {
        Ok(event) => {
            dispatch_event(&event);
            StatusCode::OK
        }
        Err(err @ WebhookError::InvalidPayload(_)) | Err(err @ WebhookError::MissingRawBody) => {
            warn!(error = %err, "Rejected webhook payload");
            StatusCode::BAD_REQUEST
        }
        Err(err) => {
            warn!(error = %err, "Webhook signature verification failed");
            StatusCode::BAD_REQUEST
        }
    }
}

/// Authenticate (when a verifier is given) and parse one delivery.
pub fn receive_event(
    verifier: Option<&SignatureVerifier>,
    headers: &HeaderMap,
    raw: Option<&RawBody>,
) -> Result<WebhookEvent, WebhookError> {
    let raw = raw.ok_or(WebhookError::MissingRawBody)?;

    if let Some(verifier) = verifier {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .ok_or(WebhookError::MissingSignature)?
            .to_str()
            .map_err(|_| WebhookError::MalformedHeader("non-ASCII header value".into()))?;

        verifier.verify(raw.as_bytes(), signature)?;
    }

    WebhookEvent::from_bytes(raw.as_bytes())
}

/// Log the event by type. Returns the kind it was dispatched as.
pub fn dispatch_event(event: &WebhookEvent) -> EventKind {
    let kind = event.kind();

    info!(
        event_type = %event.type_tag(),
        event_id = event.id().unwrap_or("-"),
        "Webhook event received"
    );

    match kind {
        EventKind::CheckoutSessionCompleted => info!("🔔 Payment received!"),
        EventKind::SubscriptionDeleted => info!("🔔 Subscription cancelled!"),
        EventKind::Other => debug!(event_type = %event.type_tag(), "No action for event type"),
    }

    kind
}
