//! Route handlers organized by resource
//!
//! Every collection and item path answers both with and without the trailing
//! slash (`/api/devices/` and `/api/devices`).

pub mod choices;
pub mod devices;
pub mod documents;
pub mod health;
pub mod maintenance;

use std::sync::Arc;

use axum::http::Uri;
use axum::routing::MethodRouter;
use axum::Router;

use super::error::ApiError;
use super::server::AppState;

pub type SharedState = Arc<AppState>;

/// Everything mounted under `/api`.
pub fn api_router() -> Router<SharedState> {
    Router::new()
        .merge(health::router())
        .merge(choices::router())
        .merge(devices::router())
        .merge(maintenance::router())
        .merge(documents::router())
}

/// Register `path` (which ends in `/`) and its slash-less twin.
pub(crate) fn both_slashes<S>(router: Router<S>, path: &str, handler: MethodRouter<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let bare = path.trim_end_matches('/');
    router.route(path, handler.clone()).route(bare, handler)
}

/// JSON 404 for unknown paths.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound {
        resource: "route",
        id: uri.path().to_owned(),
    }
}
