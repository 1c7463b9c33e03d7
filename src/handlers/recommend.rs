//! Recommendation endpoint handler
//!
//! Handles POST /recommend: validates the session payload through the
//! router's guard chain, invokes the resolved model client, and returns
//! the recommendations plus a diagnostic echo of the rendered prompt.

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::handlers::AppState;
use crate::middleware::RequestId;
use crate::router::{RecommendRequest, Recommendations};

/// Query parameters for the recommend endpoint
#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    /// "inference" (validated recommendations) or "test" (raw reply).
    /// Kept as a free string: an unknown value is a server-side dispatch
    /// failure, not a request-validation failure.
    #[serde(default = "default_mode")]
    pub mode: String,
}

fn default_mode() -> String {
    crate::router::MODE_INFERENCE.to_string()
}

/// Response payload: the recommendation outcome and the full prompt text
#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub recommendations: Recommendations,
    pub prompt: String,
}

/// POST /recommend handler
pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<RecommendQuery>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, AppError> {
    tracing::debug!(
        request_id = %request_id,
        model_id = ?request.model_id,
        tutor_id = ?request.tutor_id,
        mode = %query.mode,
        "Received recommendation request"
    );

    let (recommendations, prompt) = state.router().process(request, &query.mode).await?;

    tracing::info!(
        request_id = %request_id,
        mode = %query.mode,
        "Recommendation request completed"
    );

    Ok(Json(RecommendResponse {
        recommendations,
        prompt,
    }))
}
