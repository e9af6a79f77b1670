//! Liveness endpoint.
//!
//! `GET /health` answers without touching the provider so load balancers and
//! systemd can probe the process cheaply.

use axum::Json;
use serde::Serialize;
use tracing::{debug, instrument};

/// Crate version reported by `/health`
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name reported by `/health`
pub const SERVER_NAME: &str = env!("CARGO_PKG_NAME");

/// Body of `GET /health`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    /// Always `"healthy"` when the process can answer at all
    pub status: &'static str,
    /// Package name
    pub name: &'static str,
    /// Package version
    pub version: &'static str,
}

impl HealthResponse {
    /// The only answer this process gives
    pub const HEALTHY: Self = Self {
        status: "healthy",
        name: SERVER_NAME,
        version: SERVER_VERSION,
    };
}

/// `GET /health`
///
/// ```bash
/// curl http://localhost:4242/health
/// # {"status":"healthy","name":"billing-relay","version":"0.1.0"}
/// ```
#[instrument(skip_all)]
pub async fn health_handler() -> Json<HealthResponse> {
    debug!("Health probe");
    Json(HealthResponse::HEALTHY)
}
