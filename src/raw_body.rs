//! Selective raw-body capture.
//!
//! Signature checks need the body exactly as it arrived, so requests under
//! [`WEBHOOK_PATH_PREFIX`] are buffered once, the bytes are stored in the
//! request extensions as [`RawBody`], and an identical body is handed on to
//! the next extractor. Every other route streams its body untouched and
//! parses JSON the usual way.

use axum::body::{Body, Bytes};
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

/// Paths whose bodies are captured verbatim
pub const WEBHOOK_PATH_PREFIX: &str = "/webhook";

/// Largest body captured; Stripe events are well under this
pub const MAX_RAW_BODY_BYTES: usize = 1024 * 1024;

/// The unparsed request body, byte for byte
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBody(pub Bytes);

impl RawBody {
    /// Captured bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Whether `path` needs its body preserved
pub fn captures_raw_body(path: &str) -> bool {
    path.starts_with(WEBHOOK_PATH_PREFIX)
}

/// Middleware for `axum::middleware::from_fn`.
pub async fn capture_raw_body(request: Request, next: Next) -> Response {
    if !captures_raw_body(request.uri().path()) {
        return next.run(request).await;
    }

    let (mut parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_RAW_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(path = %parts.uri.path(), error = %err, "Could not buffer webhook body");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    parts.extensions.insert(RawBody(bytes.clone()));
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
