use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::handlers::{ErrorResponse, SuccessResponse};
use crate::state::AppState;
use common::errors::ValidationError;
use common::models::{Application, AssessmentOutcome, Automation, QueryPreview};
use common::query_builder::{QueryBuilderState, APPLICATION_ID_COLUMN};

/// SQL generated from a query builder state
#[derive(Debug, Serialize)]
pub struct GeneratedSqlResponse {
    pub sql: String,
}

/// Request to run automation SQL read-only
#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    pub sql: String,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    #[serde(flatten)]
    pub preview: QueryPreview,
    /// Automations can only be saved once the result exposes `application_id`
    pub has_application_id: bool,
}

/// Request to evaluate an automation over a set of applications
#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub automation: Automation,
    pub applications: Vec<Application>,
}

/// Generate SQL text from the visual builder state
#[tracing::instrument(skip(builder), fields(from_table = %builder.from_table))]
pub async fn generate_sql(
    Json(builder): Json<QueryBuilderState>,
) -> Json<SuccessResponse<GeneratedSqlResponse>> {
    let sql = builder.to_sql();
    tracing::debug!(sql_len = sql.len(), "Generated automation SQL");

    Json(SuccessResponse::new(GeneratedSqlResponse { sql }))
}

/// Run automation SQL read-only and return the first rows
#[tracing::instrument(skip(state, req))]
pub async fn preview_query(
    State(state): State<AppState>,
    Json(req): Json<PreviewRequest>,
) -> Result<Json<SuccessResponse<PreviewResponse>>, ErrorResponse> {
    if req.sql.trim().is_empty() {
        return Err(ValidationError::MissingField("sql".to_string()).into());
    }

    let preview = state
        .query_runner
        .run(&req.sql, state.config.preview.row_limit)
        .await?;

    let has_application_id = preview.has_column(APPLICATION_ID_COLUMN);
    if !has_application_id {
        tracing::info!(columns = ?preview.columns, "Preview result has no application_id column");
    }

    Ok(Json(SuccessResponse::new(PreviewResponse {
        preview,
        has_application_id,
    })))
}

/// Evaluate an automation and return one outcome per in-scope application
#[tracing::instrument(skip(state, req))]
pub async fn evaluate_automation(
    State(state): State<AppState>,
    Json(req): Json<EvaluateRequest>,
) -> Result<Json<SuccessResponse<Vec<AssessmentOutcome>>>, ErrorResponse> {
    if req.automation.control_id.trim().is_empty() {
        return Err(ValidationError::MissingField("automation.control_id".to_string()).into());
    }

    let outcomes = state
        .evaluator
        .evaluate(&req.automation, &req.applications)
        .await?;

    Ok(Json(SuccessResponse::new(outcomes)))
}
