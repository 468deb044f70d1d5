use axum::{
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Slack on top of the statement timeout before a request is abandoned
const REQUEST_TIMEOUT_MARGIN_SECONDS: u64 = 5;

/// Create the main application router with all routes and middleware
#[tracing::instrument(skip(state))]
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let request_timeout = Duration::from_secs(
        state.config.preview.statement_timeout_seconds + REQUEST_TIMEOUT_MARGIN_SECONDS,
    );

    let health_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness_check));

    let automation_routes = Router::new()
        .route("/api/automations/sql", post(handlers::automations::generate_sql))
        .route(
            "/api/automations/preview",
            post(handlers::automations::preview_query),
        )
        .route(
            "/api/automations/evaluate",
            post(handlers::automations::evaluate_automation),
        );

    let evidence_routes = Router::new()
        .route(
            "/api/evidence/normalize",
            post(handlers::evidence::normalize_explanation),
        )
        .route("/api/evidence/clean", post(handlers::evidence::clean_ocr));

    // Metrics endpoint for Prometheus scraping
    let metrics_routes = Router::new().route("/metrics", get(handlers::metrics::metrics_handler));

    // Combine all routes
    Router::new()
        .merge(health_routes)
        .merge(automation_routes)
        .merge(evidence_routes)
        .merge(metrics_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(cors),
        )
        .with_state(state)
}
