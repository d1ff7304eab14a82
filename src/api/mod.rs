pub mod models;
pub mod review;

// Re-exports
pub use models::*;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::trace::TraceLayer;

/// Build the application router over the given state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .merge(review::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Health check. Reports 503 when the review table cannot be read.
pub async fn health_handler(State(state): State<AppState>) -> Response {
    let (code, status, total_reviews) = match state.store.count().await {
        Ok(count) => (StatusCode::OK, "healthy", count),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", 0)
        }
    };

    let body = Json(models::HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        total_reviews,
    });
    (code, body).into_response()
}
