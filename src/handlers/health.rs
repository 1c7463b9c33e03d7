//! Health check endpoint
//!
//! Provides a simple liveness check for monitoring and load balancers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::handlers::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
    /// Number of configured model backends
    pub models: usize,
}

/// Health check handler
///
/// Returns 200 OK with the number of models in the routing table.
pub async fn handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "OK",
            models: state.router().model_ids().len(),
        }),
    )
}
