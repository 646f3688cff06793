// src/routes/health.rs
//! API health check endpoint for the landwatch backend.
//!
//! Used by container orchestrators and CI pipelines to verify that the
//! service is up. It is a sibling module in the `routes` directory:
//! - Internal to this file: endpoint handler and its response type
//! - Exports to the gateway (`mod.rs`): a subrouter containing the `/health` route
//!
//! Does not touch storage: with an unreachable database this still answers
//! `ok`, and the data routes report the outage as a warning.

use axum::{routing::get, Json, Router};
use serde::Serialize;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

/// Handle `GET /health`.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Create a subrouter containing the `/health` route.
///
/// Generic over the application state so it can merge cleanly with the
/// gateway router.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(health))
}
