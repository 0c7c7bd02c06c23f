//! Router configuration for the read API.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{column_rss, get_article, get_day, index, webhook, AppState};
use super::middleware::create_cors_layer;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let v1_routes = Router::new()
        .route("/day/:date", get(get_day))
        .route("/article/:id", get(get_article))
        .route("/zhuanlan/:name/rss", get(column_rss))
        .route("/webhook", post(webhook));

    Router::new()
        .route("/", get(index))
        .nest("/v1", v1_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
