use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::middleware::metrics_middleware;
use super::{handlers, organizer, scanner, verify};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::get_metrics))
        // Verification queue
        .route("/verify/queue", post(verify::enqueue))
        .route("/verify/queue", get(verify::get_queue))
        .route("/verify/queue/batch", post(verify::enqueue_batch))
        .route("/verify/queue/clear", post(verify::clear))
        .route("/verify/queue/results", get(verify::get_results))
        .route("/verify/queue/{id}", get(verify::get_job))
        .route("/verify/queue/{id}", delete(verify::cancel_job))
        // Scanner
        .route("/scanner/start", post(scanner::start_scan))
        .route("/scanner/stop", post(scanner::stop_scan))
        .route("/scanner/status", get(scanner::get_status))
        .route("/scanner/preview", get(scanner::preview))
        // Organizer
        .route("/organizer/preview", post(organizer::preview))
        .route("/organizer/start", post(organizer::start))
        .route("/organizer/stop", post(organizer::stop))
        .route("/organizer/status", get(organizer::get_status))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
