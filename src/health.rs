//! Health check endpoints for deployment platform monitoring.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Router};

use crate::database::Database;

/// Routes answering `/health` and `/`.
///
/// `/health` also pings the database so a wedged pool is reported as 503.
pub fn router(db: Arc<Database>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/", get(root_handler))
        .with_state(db)
}

async fn health_handler(State(db): State<Arc<Database>>) -> (StatusCode, &'static str) {
    match db.health_check().await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE")
        }
    }
}

async fn root_handler() -> &'static str {
    "OK"
}
