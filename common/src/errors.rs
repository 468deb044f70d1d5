// Error handling framework

use thiserror::Error;

/// Validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Database-specific errors
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Database health check failed: {0}")]
    HealthCheckFailed(String),

    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}

/// Errors raised while running automation SQL read-only
#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("Query is empty")]
    EmptyQuery,

    #[error("Only SELECT statements can be previewed")]
    NotReadOnly,

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Query timed out after {0} seconds")]
    Timeout(u64),

    #[error("Query result must include an 'application_id' column (found: {columns:?})")]
    MissingApplicationId { columns: Vec<String> },

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Variable substitution errors
#[derive(Error, Debug)]
pub enum SubstitutionError {
    #[error("Undefined variable(s) in template: {variables:?}. Template: {template}")]
    UndefinedVariable {
        variables: Vec<String>,
        template: String,
    },

    #[error("Regex compilation error: {0}")]
    RegexError(String),
}

/// Automation evaluation errors
#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("Automation '{0}' has no SQL")]
    MissingSql(String),

    #[error("Automation query returned more than {0} rows")]
    TooManyRows(u32),

    #[error("Automation query failed: {0}")]
    Preview(#[from] PreviewError),

    #[error("Narrative rendering failed: {0}")]
    Narrative(#[from] SubstitutionError),
}

/// API response error type for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::new("VALIDATION_ERROR", err.to_string())
    }
}

impl From<PreviewError> for ApiError {
    fn from(err: PreviewError) -> Self {
        match err {
            PreviewError::EmptyQuery | PreviewError::NotReadOnly => {
                ApiError::new("VALIDATION_ERROR", err.to_string())
            }
            PreviewError::MissingApplicationId { ref columns } => {
                let details = serde_json::json!({ "columns": columns });
                ApiError::new("VALIDATION_ERROR", err.to_string()).with_details(details)
            }
            // Driver messages go to details; the headline stays generic
            PreviewError::QueryFailed(_)
            | PreviewError::Timeout(_)
            | PreviewError::Database(_) => ApiError::new("QUERY_ERROR", "query error")
                .with_details(serde_json::json!({ "reason": err.to_string() })),
        }
    }
}

impl From<SubstitutionError> for ApiError {
    fn from(err: SubstitutionError) -> Self {
        ApiError::new("SUBSTITUTION_ERROR", err.to_string())
    }
}

impl From<EvaluationError> for ApiError {
    fn from(err: EvaluationError) -> Self {
        match err {
            EvaluationError::Preview(inner) => inner.into(),
            EvaluationError::Narrative(inner) => inner.into(),
            EvaluationError::MissingSql(_) | EvaluationError::TooManyRows(_) => {
                ApiError::new("VALIDATION_ERROR", err.to_string())
            }
        }
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => DatabaseError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => DatabaseError::ConnectionFailed(err.to_string()),
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}
