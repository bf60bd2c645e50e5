//! Document reference endpoints
//!
//! - GET/POST /api/documents/ (`?device=<id>` filters by owner)
//! - GET/PUT/PATCH/DELETE /api/documents/{id}/

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Map, Value};

use medtrack_core::RecordId;

use super::{both_slashes, SharedState};
use crate::db::DocumentRepository;
use crate::http::error::ApiError;
use crate::http::extractors::{JsonObject, RecordIdPath, ValidQuery};
use crate::models::{DocumentChanges, DocumentResponse, ListBody, RecordListParams, WriteMode};

async fn list_documents(
    State(state): State<SharedState>,
    ValidQuery(params): ValidQuery<RecordListParams>,
) -> Result<Json<ListBody<DocumentResponse>>, ApiError> {
    let (filter, page) = params.into_filter()?;
    let listing = state.store.list_documents(&filter, page).await?;
    Ok(Json(ListBody::new(listing.map(DocumentResponse::from), page)?))
}

async fn create_document(
    State(state): State<SharedState>,
    JsonObject(body): JsonObject,
) -> Result<(StatusCode, Json<DocumentResponse>), ApiError> {
    let draft = DocumentChanges::read(&body, WriteMode::Full)?.into_new_draft()?;
    let document = state.store.create_document(draft).await?;
    tracing::info!(id = document.id, device = document.device, "document created");
    Ok((StatusCode::CREATED, Json(document.into())))
}

async fn get_document(
    State(state): State<SharedState>,
    RecordIdPath(id): RecordIdPath,
) -> Result<Json<DocumentResponse>, ApiError> {
    Ok(Json(state.store.get_document(id).await?.into()))
}

async fn update_document(
    state: SharedState,
    id: RecordId,
    body: Map<String, Value>,
    mode: WriteMode,
) -> Result<Json<DocumentResponse>, ApiError> {
    let changes = DocumentChanges::read(&body, mode)?;
    let mut draft = state.store.get_document(id).await?.to_draft();
    changes.apply(&mut draft);

    Ok(Json(state.store.update_document(id, draft).await?.into()))
}

async fn replace_document(
    State(state): State<SharedState>,
    RecordIdPath(id): RecordIdPath,
    JsonObject(body): JsonObject,
) -> Result<Json<DocumentResponse>, ApiError> {
    update_document(state, id, body, WriteMode::Full).await
}

async fn patch_document(
    State(state): State<SharedState>,
    RecordIdPath(id): RecordIdPath,
    JsonObject(body): JsonObject,
) -> Result<Json<DocumentResponse>, ApiError> {
    update_document(state, id, body, WriteMode::Partial).await
}

async fn delete_document(
    State(state): State<SharedState>,
    RecordIdPath(id): RecordIdPath,
) -> Result<StatusCode, ApiError> {
    state.store.delete_document(id).await?;
    tracing::info!(id, "document deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<SharedState> {
    let router = both_slashes(
        Router::new(),
        "/documents/",
        get(list_documents).post(create_document),
    );
    both_slashes(
        router,
        "/documents/{id}/",
        get(get_document)
            .put(replace_document)
            .patch(patch_document)
            .delete(delete_document),
    )
}
