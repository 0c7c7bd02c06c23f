//! Day and article handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::web::error::ApiError;
use crate::web::handlers::AppState;

fn payload(raw: &str) -> Result<Json<Value>, ApiError> {
    serde_json::from_str(raw).map(Json).map_err(|e| {
        tracing::error!(error = %e, "Stored payload is not valid JSON");
        ApiError::internal("Stored payload is corrupt")
    })
}

/// GET /v1/day/:date - Day listing, filled from upstream when absent.
pub async fn get_day(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let day = state.daily.get_day(&date).await?;
    payload(&day.data)
}

/// GET /v1/article/:id - Stored article payload.
pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let article = state.daily.get_article(id).await?;
    payload(&article.data)
}
