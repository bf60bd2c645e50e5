//! Code/label tables for the coded fields, for building select inputs

use axum::routing::get;
use axum::{Json, Router};

use medtrack_core::labels::ChoiceTables;

use super::{both_slashes, SharedState};

/// GET /api/choices/
async fn choices() -> Json<ChoiceTables> {
    Json(ChoiceTables::build())
}

pub fn router() -> Router<SharedState> {
    both_slashes(Router::new(), "/choices/", get(choices))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_every_status() {
        let Json(tables) = choices().await;
        let value = serde_json::to_value(tables).unwrap();
        assert_eq!(value["status"].as_array().map(Vec::len), Some(6));
        assert_eq!(value["device_type"][0]["code"], "INFUSION_PUMP");
    }
}
