//! Liveness probe.
//!
//! The translator has no backing store, so reaching the handler is the whole check.

use axum::{routing::get, Json, Router};
use serde::Serialize;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `healthy`; an unhealthy server does not answer.
    pub status: &'static str,
    /// Binary name, `logchef-api`.
    pub service: &'static str,
    /// Crate version the server was built from.
    pub version: &'static str,
}

impl HealthResponse {
    const LIVE: Self = Self {
        status: "healthy",
        service: "logchef-api",
        version: env!("CARGO_PKG_VERSION"),
    };
}

/// Routes for the liveness probe.
pub fn health_routes() -> Router {
    Router::new().route("/health", get(|| async { Json(HealthResponse::LIVE) }))
}
