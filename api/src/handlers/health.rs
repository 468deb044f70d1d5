use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::handlers::{ErrorResponse, SuccessResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub database: &'static str,
}

/// Health check endpoint
#[tracing::instrument]
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Readiness check: the service is ready once the database answers
#[tracing::instrument(skip(state))]
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse<ReadinessResponse>>, ErrorResponse> {
    state.db_pool.health_check().await.map_err(|e| {
        ErrorResponse::new("service_unavailable", "Database is not reachable")
            .with_details(serde_json::json!({ "reason": e.to_string() }))
    })?;

    Ok(Json(SuccessResponse::new(ReadinessResponse { database: "ok" })))
}
