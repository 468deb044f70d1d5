pub mod automations;
pub mod evidence;
pub mod health;
pub mod metrics;

// Common response types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::errors::{ApiError, EvaluationError, PreviewError, ValidationError};
use serde::Serialize;

/// Standard API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub trace_id: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            trace_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = match self.error.as_str() {
            "validation_error" => StatusCode::BAD_REQUEST,
            "query_error" | "substitution_error" => StatusCode::UNPROCESSABLE_ENTITY,
            "service_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        let response = ErrorResponse::new(err.code.to_ascii_lowercase(), err.message);
        match err.details {
            Some(details) => response.with_details(details),
            None => response,
        }
    }
}

impl From<ValidationError> for ErrorResponse {
    fn from(err: ValidationError) -> Self {
        ApiError::from(err).into()
    }
}

impl From<PreviewError> for ErrorResponse {
    fn from(err: PreviewError) -> Self {
        ApiError::from(err).into()
    }
}

impl From<EvaluationError> for ErrorResponse {
    fn from(err: EvaluationError) -> Self {
        ApiError::from(err).into()
    }
}

/// Standard API success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_code_maps_to_lowercase_error() {
        let response: ErrorResponse = PreviewError::QueryFailed("boom".to_string()).into();
        assert_eq!(response.error, "query_error");
        assert_eq!(response.message, "query error");
        assert!(response.details.is_some());
    }

    #[test]
    fn test_validation_error_is_bad_request() {
        let response: ErrorResponse = ValidationError::MissingField("sql".to_string()).into();
        assert_eq!(response.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
