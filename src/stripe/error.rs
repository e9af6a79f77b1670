//! Error types for the Stripe provider client and webhook verification.

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while talking to the Stripe REST API.
#[derive(Error, Debug)]
pub enum StripeError {
    /// Stripe answered with a non-2xx status and an error object
    #[error("{message}")]
    Api {
        /// HTTP status returned by Stripe
        status: u16,
        /// Stripe error type (`invalid_request_error`, `card_error`, ...)
        error_type: Option<String>,
        /// Stripe error code (`resource_missing`, ...)
        code: Option<String>,
        /// Human readable message, passed through unmodified
        message: String,
    },

    /// The request never produced a response (DNS, TLS, connection reset)
    #[error("Stripe request failed: {0}")]
    Transport(String),

    /// A 2xx response body did not have the expected shape
    #[error("Unexpected Stripe response: {0}")]
    Decode(String),

    /// A reference was rejected before any request was made
    #[error("Invalid {kind} reference: {reference:?}")]
    InvalidReference {
        /// Kind of object the reference points at
        kind: &'static str,
        /// The offending reference
        reference: String,
    },
}

/// Result alias for provider calls
pub type StripeResult<T> = std::result::Result<T, StripeError>;

impl StripeError {
    /// Build an API error from a Stripe error body.
    ///
    /// Falls back to the raw body text when it is not a Stripe error object.
    pub fn from_response_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => Self::Api {
                status,
                error_type: envelope.error.error_type,
                code: envelope.error.code,
                message: envelope
                    .error
                    .message
                    .unwrap_or_else(|| format!("Stripe returned HTTP {status}")),
            },
            Err(_) => Self::Api {
                status,
                error_type: None,
                code: None,
                message: if body.trim().is_empty() {
                    format!("Stripe returned HTTP {status}")
                } else {
                    body.trim().to_string()
                },
            },
        }
    }

    /// HTTP status reported by Stripe, if the error came from Stripe at all.
    pub fn provider_status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for StripeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StripeError::Decode(err.to_string())
        } else {
            StripeError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    error_type: Option<String>,
    code: Option<String>,
    message: Option<String>,
}

/// Webhook verification failures. Every variant maps to HTTP 400.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WebhookError {
    /// No `stripe-signature` header on the request
    #[error("Missing stripe-signature header")]
    MissingSignature,

    /// Header present but not `t=...,v1=...`
    #[error("Malformed stripe-signature header: {0}")]
    MalformedHeader(String),

    /// No `v1` signature matched the expected HMAC
    #[error("No signatures found matching the expected signature for payload")]
    SignatureMismatch,

    /// Signed timestamp is outside the tolerance window
    #[error("Timestamp outside the tolerance zone ({age_secs}s old)")]
    TimestampOutOfTolerance {
        /// Age of the signature in seconds (negative when in the future)
        age_secs: i64,
    },

    /// Body is not a JSON event
    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),

    /// Raw body was not captured for this request
    #[error("Raw request body unavailable")]
    MissingRawBody,
}
