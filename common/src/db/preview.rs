// Read-only execution of automation SQL
// Every run happens in a READ ONLY transaction that is rolled back afterwards

use crate::config::PreviewConfig;
use crate::db::DbPool;
use crate::errors::{DatabaseError, PreviewError};
use crate::models::QueryPreview;
use crate::query_builder::APPLICATION_ID_COLUMN;
use crate::telemetry;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map, Value};
use sqlx::postgres::PgRow;
use sqlx::{Column, Executor, Row};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Postgres SQLSTATE for a statement cancelled by `statement_timeout`
const QUERY_CANCELED: &str = "57014";

/// Runs automation SQL and returns its rows
#[async_trait]
pub trait QueryRunner: Send + Sync {
    /// Execute `sql` read-only, returning at most `row_limit` rows
    async fn run(&self, sql: &str, row_limit: u32) -> Result<QueryPreview, PreviewError>;
}

/// Wrap user SQL so it can only read and only return a bounded number of rows.
///
/// One trailing `;` is dropped. The statement must start with SELECT or WITH.
/// One extra row is requested so truncation can be detected.
pub fn prepare_preview_sql(sql: &str, row_limit: u32) -> Result<String, PreviewError> {
    let trimmed = sql.trim();
    let trimmed = trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end();

    if trimmed.is_empty() {
        return Err(PreviewError::EmptyQuery);
    }

    let keyword: String = trimmed
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_uppercase();
    if keyword != "SELECT" && keyword != "WITH" {
        return Err(PreviewError::NotReadOnly);
    }

    Ok(format!(
        "SELECT * FROM (\n{}\n) AS preview LIMIT {}",
        trimmed,
        u64::from(row_limit) + 1
    ))
}

/// Check the result carries the column automations are matched on
pub fn validate_application_id(preview: &QueryPreview) -> Result<(), PreviewError> {
    if preview.has_column(APPLICATION_ID_COLUMN) {
        Ok(())
    } else {
        Err(PreviewError::MissingApplicationId {
            columns: preview.columns.clone(),
        })
    }
}

/// PreviewExecutor runs automation SQL against the application database
#[derive(Debug, Clone)]
pub struct PreviewExecutor {
    pool: DbPool,
    statement_timeout: Duration,
}

impl PreviewExecutor {
    pub fn new(pool: DbPool, config: &PreviewConfig) -> Self {
        Self {
            pool,
            statement_timeout: Duration::from_secs(config.statement_timeout_seconds),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.statement_timeout
    }

    #[tracing::instrument(skip(self, sql))]
    async fn run_read_only(&self, sql: &str, row_limit: u32) -> Result<QueryPreview, PreviewError> {
        let wrapped = prepare_preview_sql(sql, row_limit)?;

        let mut tx = self
            .pool
            .pool()
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        // SET does not accept bind parameters
        let timeout_ms = self.statement_timeout.as_millis();
        sqlx::query(&format!("SET LOCAL statement_timeout = {}", timeout_ms))
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        let rows = sqlx::query(&wrapped)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| self.classify(e))?;

        let columns: Vec<String> = match rows.first() {
            Some(row) => row.columns().iter().map(|c| c.name().to_string()).collect(),
            None => (&mut *tx)
                .describe(&wrapped)
                .await
                .map_err(|e| self.classify(e))?
                .columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
        };

        if let Err(e) = tx.rollback().await {
            tracing::warn!(error = %e, "Failed to roll back preview transaction");
        }

        let truncated = rows.len() > row_limit as usize;
        let rows: Vec<Map<String, Value>> = rows
            .iter()
            .take(row_limit as usize)
            .map(row_to_json)
            .collect();

        Ok(QueryPreview {
            columns,
            row_count: rows.len(),
            rows,
            truncated,
        })
    }

    fn classify(&self, err: sqlx::Error) -> PreviewError {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(QUERY_CANCELED) {
                return PreviewError::Timeout(self.statement_timeout.as_secs());
            }
            return PreviewError::QueryFailed(db_err.message().to_string());
        }
        PreviewError::Database(DatabaseError::from(err))
    }
}

#[async_trait]
impl QueryRunner for PreviewExecutor {
    async fn run(&self, sql: &str, row_limit: u32) -> Result<QueryPreview, PreviewError> {
        let started = Instant::now();
        let result = self.run_read_only(sql, row_limit).await;
        let elapsed = started.elapsed().as_secs_f64();

        match &result {
            Ok(preview) => {
                telemetry::record_query_preview("success", elapsed);
                tracing::info!(
                    rows = preview.row_count,
                    truncated = preview.truncated,
                    duration_seconds = elapsed,
                    "Automation query executed"
                );
            }
            Err(e) => {
                telemetry::record_query_preview("failure", elapsed);
                tracing::warn!(error = %e, duration_seconds = elapsed, "Automation query failed");
            }
        }

        result
    }
}

/// Convert a Postgres row into a JSON object keyed by column name
fn row_to_json(row: &PgRow) -> Map<String, Value> {
    let mut row_map = Map::new();

    for (i, column) in row.columns().iter().enumerate() {
        let value: Value = if let Ok(v) = row.try_get::<String, _>(i) {
            json!(v)
        } else if let Ok(v) = row.try_get::<i32, _>(i) {
            json!(v)
        } else if let Ok(v) = row.try_get::<i64, _>(i) {
            json!(v)
        } else if let Ok(v) = row.try_get::<i16, _>(i) {
            json!(v)
        } else if let Ok(v) = row.try_get::<f64, _>(i) {
            json!(v)
        } else if let Ok(v) = row.try_get::<bool, _>(i) {
            json!(v)
        } else if let Ok(v) = row.try_get::<Uuid, _>(i) {
            json!(v.to_string())
        } else if let Ok(v) = row.try_get::<chrono::NaiveDateTime, _>(i) {
            json!(v.to_string())
        } else if let Ok(v) = row.try_get::<chrono::DateTime<Utc>, _>(i) {
            json!(v.to_rfc3339())
        } else if let Ok(v) = row.try_get::<Value, _>(i) {
            v
        } else if let Ok(v) = row.try_get::<Vec<String>, _>(i) {
            json!(v)
        } else {
            Value::Null
        };

        row_map.insert(column.name().to_string(), value);
    }

    row_map
}
