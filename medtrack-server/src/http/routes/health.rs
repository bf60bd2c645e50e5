//! Health check endpoint

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use super::{both_slashes, SharedState};
use crate::db::Store;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub backend: &'static str,
}

/// GET /api/health/
///
/// 503 when the store cannot be reached.
async fn health(State(state): State<SharedState>) -> (StatusCode, Json<HealthResponse>) {
    let (code, status) = match state.store.health_check().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            backend: state.store.backend(),
        }),
    )
}

/// Health routes
pub fn router() -> Router<SharedState> {
    both_slashes(Router::new(), "/health/", get(health))
}
