//! Error types for the billing relay
//!
//! `Error` covers startup and wiring failures. Request-time failures are
//! rendered through [`ApiError`], which produces the `{"error": {"message"}}`
//! envelope callers of the JSON routes see.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::stripe::error::StripeError;

/// Startup failures: anything that stops the relay from building its state
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Provider client could not be built
    #[error("Stripe error: {0}")]
    Stripe(#[from] StripeError),
}

/// Result type alias for startup operations
pub type Result<T> = std::result::Result<T, Error>;

/// JSON error envelope body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEnvelope {
    /// Wrapped error
    pub error: ErrorMessage,
}

/// Message part of the envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorMessage {
    /// Failure reason, passed through unmodified from the provider when it has one
    pub message: String,
}

/// An HTTP error response carrying the JSON envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Response status
    pub status: StatusCode,
    /// Failure reason
    pub message: String,
}

impl ApiError {
    /// Error with an explicit status
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400 with `message`
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 400 for a missing or blank parameter
    pub fn missing_param(name: &str) -> Self {
        Self::bad_request(format!("Missing required parameter: {name}"))
    }

    /// Provider failure collapsed to 400, whatever Stripe said.
    pub fn from_provider_as_bad_request(err: &StripeError) -> Self {
        Self::bad_request(err.to_string())
    }

    /// Provider failure with Stripe's own client-error status relayed.
    ///
    /// 4xx from Stripe keeps its status; Stripe 5xx, transport and decode
    /// failures become 502; a locally rejected reference is 400.
    pub fn from_provider(err: &StripeError) -> Self {
        let status = match err {
            StripeError::InvalidReference { .. } => StatusCode::BAD_REQUEST,
            _ => err
                .provider_status()
                .and_then(|status| StatusCode::from_u16(status).ok())
                .filter(StatusCode::is_client_error)
                .unwrap_or(StatusCode::BAD_GATEWAY),
        };
        Self::new(status, err.to_string())
    }

    /// Envelope body for this error
    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorMessage {
                message: self.message.clone(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(self.envelope());
        (self.status, body).into_response()
    }
}
