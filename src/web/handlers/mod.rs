//! API handlers.

pub mod column;
pub mod daily;
pub mod webhook;

use std::sync::Arc;

use axum::http::StatusCode;

use crate::column::ColumnFeedGenerator;
use crate::daily::DailyService;

pub use column::column_rss;
pub use daily::{get_article, get_day};
pub use webhook::webhook;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub daily: DailyService,
    pub columns: Arc<ColumnFeedGenerator>,
    /// Executable run when the webhook fires.
    pub webhook_script: Option<String>,
}

impl AppState {
    pub fn new(daily: DailyService, columns: Arc<ColumnFeedGenerator>) -> Self {
        Self {
            daily,
            columns,
            webhook_script: None,
        }
    }

    /// Set the webhook script.
    pub fn with_webhook_script(mut self, script: Option<String>) -> Self {
        self.webhook_script = script;
        self
    }
}

/// GET / - The root is not browsable.
pub async fn index() -> (StatusCode, &'static str) {
    (StatusCode::FORBIDDEN, "Forbidden")
}
