//! Custom Axum extractors
//!
//! Every rejection is an [`ApiError`], so malformed input gets the same JSON
//! error body as a failed validation.

use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use medtrack_core::{RecordId, ValidationError};

use super::error::ApiError;

/// Record id from the path. Anything that is not an integer cannot name a
/// record, so it is reported as not found.
pub struct RecordIdPath(pub RecordId);

impl<S> FromRequestParts<S> for RecordIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::NotFound {
                resource: "record",
                id: String::new(),
            })?;

        raw.parse::<RecordId>()
            .map(Self)
            .map_err(|_| ApiError::NotFound {
                resource: "record",
                id: raw,
            })
    }
}

/// Query string that fails with a JSON error body.
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ValidationError::Malformed {
                reason: rejection.body_text(),
            })?;
        Ok(Self(value))
    }
}

/// Request body that must be a JSON object.
pub struct JsonObject(pub Map<String, Value>);

impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ValidationError::Malformed {
                reason: rejection.body_text(),
            })?;

        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(ValidationError::Malformed {
                reason: "expected a JSON object".into(),
            }
            .into()),
        }
    }
}
