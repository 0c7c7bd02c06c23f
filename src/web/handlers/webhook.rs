//! Deploy webhook.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
};
use std::sync::Arc;
use tokio::process::Command;

use crate::web::handlers::AppState;

/// Header carrying the payload signature.
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature";

/// Only the signature scheme is checked, not the digest.
fn has_signature(headers: &HeaderMap) -> bool {
    headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("sha1="))
}

/// POST /v1/webhook - Launch the configured script in the background.
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> (StatusCode, &'static str) {
    if !has_signature(&headers) {
        tracing::warn!("Webhook call without signature rejected");
        return (StatusCode::FORBIDDEN, "Forbidden.");
    }

    match &state.webhook_script {
        Some(script) => match Command::new(script).spawn() {
            Ok(mut child) => {
                tracing::info!(%script, pid = child.id(), "Webhook script started");
                tokio::spawn(async move {
                    match child.wait().await {
                        Ok(status) => tracing::info!(%status, "Webhook script finished"),
                        Err(e) => tracing::warn!(error = %e, "Failed to wait for webhook script"),
                    }
                });
            }
            Err(e) => tracing::error!(%script, error = %e, "Failed to start webhook script"),
        },
        None => tracing::info!("Webhook received but no script is configured"),
    }

    (StatusCode::OK, "Ok")
}
