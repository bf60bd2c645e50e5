//! Maintenance record endpoints
//!
//! - GET/POST /api/maintenance/ (`?device=<id>` filters by owner)
//! - GET/PUT/PATCH/DELETE /api/maintenance/{id}/

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Map, Value};

use medtrack_core::RecordId;

use super::{both_slashes, SharedState};
use crate::db::MaintenanceRepository;
use crate::http::error::ApiError;
use crate::http::extractors::{JsonObject, RecordIdPath, ValidQuery};
use crate::models::{
    ListBody, MaintenanceChanges, MaintenanceResponse, RecordListParams, WriteMode,
};

async fn list_maintenance(
    State(state): State<SharedState>,
    ValidQuery(params): ValidQuery<RecordListParams>,
) -> Result<Json<ListBody<MaintenanceResponse>>, ApiError> {
    let (filter, page) = params.into_filter()?;
    let listing = state.store.list_maintenance(&filter, page).await?;
    Ok(Json(ListBody::new(
        listing.map(MaintenanceResponse::from),
        page,
    )?))
}

async fn create_maintenance(
    State(state): State<SharedState>,
    JsonObject(body): JsonObject,
) -> Result<(StatusCode, Json<MaintenanceResponse>), ApiError> {
    let draft = MaintenanceChanges::read(&body, WriteMode::Full)?.into_new_draft()?;
    let record = state.store.create_maintenance(draft).await?;
    tracing::info!(id = record.id, device = record.device, "maintenance record created");
    Ok((StatusCode::CREATED, Json(record.into())))
}

async fn get_maintenance(
    State(state): State<SharedState>,
    RecordIdPath(id): RecordIdPath,
) -> Result<Json<MaintenanceResponse>, ApiError> {
    let record = state.store.get_maintenance(id).await?;
    Ok(Json(record.into()))
}

async fn update_maintenance(
    state: SharedState,
    id: RecordId,
    body: Map<String, Value>,
    mode: WriteMode,
) -> Result<Json<MaintenanceResponse>, ApiError> {
    let changes = MaintenanceChanges::read(&body, mode)?;
    let mut draft = state.store.get_maintenance(id).await?.to_draft();
    changes.apply(&mut draft);

    let record = state.store.update_maintenance(id, draft).await?;
    Ok(Json(record.into()))
}

async fn replace_maintenance(
    State(state): State<SharedState>,
    RecordIdPath(id): RecordIdPath,
    JsonObject(body): JsonObject,
) -> Result<Json<MaintenanceResponse>, ApiError> {
    update_maintenance(state, id, body, WriteMode::Full).await
}

async fn patch_maintenance(
    State(state): State<SharedState>,
    RecordIdPath(id): RecordIdPath,
    JsonObject(body): JsonObject,
) -> Result<Json<MaintenanceResponse>, ApiError> {
    update_maintenance(state, id, body, WriteMode::Partial).await
}

async fn delete_maintenance(
    State(state): State<SharedState>,
    RecordIdPath(id): RecordIdPath,
) -> Result<StatusCode, ApiError> {
    state.store.delete_maintenance(id).await?;
    tracing::info!(id, "maintenance record deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<SharedState> {
    let router = both_slashes(
        Router::new(),
        "/maintenance/",
        get(list_maintenance).post(create_maintenance),
    );
    both_slashes(
        router,
        "/maintenance/{id}/",
        get(get_maintenance)
            .put(replace_maintenance)
            .patch(patch_maintenance)
            .delete(delete_maintenance),
    )
}
