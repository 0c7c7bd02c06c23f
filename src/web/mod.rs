//! Read API.
//!
//! Serves stored days and articles, generated column feeds and the deploy
//! webhook over HTTP.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_health_router, create_router};
pub use server::WebServer;
