use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use common::automation::AutomationEvaluator;
use common::config::Settings;
use common::db::{DbPool, QueryRunner};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: DbPool,
    pub query_runner: Arc<dyn QueryRunner>,
    pub evaluator: Arc<AutomationEvaluator>,
    pub config: Arc<Settings>,
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    /// Create a new AppState instance
    ///
    /// Previews and evaluations share the runner; evaluation reads up to
    /// `preview.evaluation_row_limit` rows.
    pub fn new(
        db_pool: DbPool,
        query_runner: Arc<dyn QueryRunner>,
        config: Settings,
        metrics_handle: PrometheusHandle,
    ) -> Self {
        let evaluator = Arc::new(AutomationEvaluator::new(
            query_runner.clone(),
            config.preview.evaluation_row_limit,
        ));

        Self {
            db_pool,
            query_runner,
            evaluator,
            config: Arc::new(config),
            metrics_handle,
        }
    }
}
