//! Column feed handler.

use axum::{
    extract::{Path, State},
    http::header::CONTENT_TYPE,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::MirrorError;

/// Content type of generated feeds.
pub const RSS_CONTENT_TYPE: &str = "application/xml;charset=UTF-8";

/// GET /v1/zhuanlan/:name/rss - Last generated feed of a column.
pub async fn column_rss(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let content = state.columns.read_feed(&name).await.map_err(|e| match e {
        MirrorError::Validation(_) => ApiError::not_found(format!("column feed {name} not found")),
        other => ApiError::from(other),
    })?;

    Ok(([(CONTENT_TYPE, RSS_CONTENT_TYPE)], content))
}
