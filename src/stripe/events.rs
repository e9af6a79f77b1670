//! Stripe Event Types
//!
//! The relay only cares about the event type tag. The delivery is kept as an
//! untyped JSON value: any JSON document is a valid delivery, and fields of
//! an unexpected shape read as absent rather than failing the request.

use std::str::FromStr;

use serde_json::Value;

use crate::stripe::error::WebhookError;

/// Event categories the relay reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `checkout.session.completed`: a customer finished paying
    CheckoutSessionCompleted,
    /// `customer.subscription.deleted`: a subscription ended
    SubscriptionDeleted,
    /// Anything else, accepted and ignored
    Other,
}

impl FromStr for EventKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            "customer.subscription.deleted" => Self::SubscriptionDeleted,
            _ => Self::Other,
        })
    }
}

/// One webhook delivery, parsed but not interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
    body: Value,
}

impl WebhookEvent {
    /// Parse from the raw request bytes.
    ///
    /// Only bytes that are not JSON at all are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WebhookError> {
        serde_json::from_slice(bytes)
            .map(|body| Self { body })
            .map_err(|e| WebhookError::InvalidPayload(e.to_string()))
    }

    /// Event ID (`evt_...`), when present as a string
    pub fn id(&self) -> Option<&str> {
        self.body.get("id").and_then(Value::as_str)
    }

    /// Event type tag, when present as a string
    pub fn event_type(&self) -> Option<&str> {
        self.body.get("type").and_then(Value::as_str)
    }

    /// Event payload, `Null` when absent
    pub fn data(&self) -> &Value {
        self.body.get("data").unwrap_or(&Value::Null)
    }

    /// Typed event kind
    pub fn kind(&self) -> EventKind {
        match self.event_type() {
            Some(tag) => tag.parse().unwrap_or(EventKind::Other),
            None => EventKind::Other,
        }
    }

    /// Type tag for logging
    pub fn type_tag(&self) -> &str {
        self.event_type().unwrap_or("<none>")
    }
}
