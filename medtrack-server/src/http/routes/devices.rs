//! Device endpoints
//!
//! - GET/POST /api/devices/
//! - GET /api/devices/statistics/
//! - GET/PUT/PATCH/DELETE /api/devices/{id}/

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use medtrack_core::{Device, DeviceStatistics, RecordFilter};

use super::{both_slashes, SharedState};
use crate::db::{
    DeviceRepository, DocumentRepository, MaintenanceRepository, StatisticsRepository, Store,
};
use crate::http::error::ApiError;
use crate::http::extractors::{JsonObject, RecordIdPath, ValidQuery};
use crate::models::{
    DeviceChanges, DeviceListItem, DeviceListParams, DeviceResponse, ListBody, WriteMode,
};

/// Full representation: the device plus its records and documents.
async fn detail(store: &dyn Store, device: Device) -> Result<DeviceResponse, ApiError> {
    let owned = RecordFilter::for_device(device.id);
    let records = store.list_maintenance(&owned, None).await?.items;
    let documents = store.list_documents(&owned, None).await?.items;
    Ok(DeviceResponse::assemble(device, records, documents))
}

/// GET /api/devices/
async fn list_devices(
    State(state): State<SharedState>,
    ValidQuery(params): ValidQuery<DeviceListParams>,
) -> Result<Json<ListBody<DeviceListItem>>, ApiError> {
    let (filter, page) = params.into_filter()?;
    let listing = state.store.list_devices(&filter, page).await?;
    Ok(Json(ListBody::new(listing.map(DeviceListItem::from), page)?))
}

/// POST /api/devices/
async fn create_device(
    State(state): State<SharedState>,
    JsonObject(body): JsonObject,
) -> Result<(StatusCode, Json<DeviceResponse>), ApiError> {
    let draft = DeviceChanges::read(&body, WriteMode::Full)?.into_new_draft()?;
    let device = state.store.create_device(draft).await?;
    tracing::info!(id = device.id, serial = %device.serial_number, "device created");

    let response = detail(state.store.as_ref(), device).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/devices/{id}/
async fn get_device(
    State(state): State<SharedState>,
    RecordIdPath(id): RecordIdPath,
) -> Result<Json<DeviceResponse>, ApiError> {
    let device = state.store.get_device(id).await?;
    Ok(Json(detail(state.store.as_ref(), device).await?))
}

/// Shared by PUT and PATCH: merge the change-set into the stored device.
async fn update_device(
    state: SharedState,
    id: i64,
    body: serde_json::Map<String, serde_json::Value>,
    mode: WriteMode,
) -> Result<Json<DeviceResponse>, ApiError> {
    let changes = DeviceChanges::read(&body, mode)?;
    let mut draft = state.store.get_device(id).await?.to_draft();
    changes.apply(&mut draft);

    let device = state.store.update_device(id, draft).await?;
    tracing::info!(id, status = %device.status, "device updated");
    Ok(Json(detail(state.store.as_ref(), device).await?))
}

/// PUT /api/devices/{id}/
async fn replace_device(
    State(state): State<SharedState>,
    RecordIdPath(id): RecordIdPath,
    JsonObject(body): JsonObject,
) -> Result<Json<DeviceResponse>, ApiError> {
    update_device(state, id, body, WriteMode::Full).await
}

/// PATCH /api/devices/{id}/
async fn patch_device(
    State(state): State<SharedState>,
    RecordIdPath(id): RecordIdPath,
    JsonObject(body): JsonObject,
) -> Result<Json<DeviceResponse>, ApiError> {
    update_device(state, id, body, WriteMode::Partial).await
}

/// DELETE /api/devices/{id}/
async fn delete_device(
    State(state): State<SharedState>,
    RecordIdPath(id): RecordIdPath,
) -> Result<StatusCode, ApiError> {
    let removed = state.store.delete_device(id).await?;
    tracing::info!(
        id,
        maintenance_records = removed.maintenance_records,
        documents = removed.documents,
        "device deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/devices/statistics/
async fn statistics(State(state): State<SharedState>) -> Result<Json<DeviceStatistics>, ApiError> {
    let query = state.statistics.query(Utc::now());
    Ok(Json(state.store.statistics(&query).await?))
}

/// Device routes
pub fn router() -> Router<SharedState> {
    let router = both_slashes(
        Router::new(),
        "/devices/",
        get(list_devices).post(create_device),
    );
    let router = both_slashes(router, "/devices/statistics/", get(statistics));
    both_slashes(
        router,
        "/devices/{id}/",
        get(get_device)
            .put(replace_device)
            .patch(patch_device)
            .delete(delete_device),
    )
}
