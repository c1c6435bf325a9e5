//! Maintenance handlers

use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// Exact phrase required to wipe the database.
const WIPE_CONFIRMATION: &str = "DELETE ALL DATA";

/// GET /api/v1/maintenance/stats
pub async fn get_stats(State(state): State<AppState>) -> Json<BTreeMap<&'static str, usize>> {
    Json(state.inventory.stats())
}

#[derive(Deserialize)]
pub struct CleanRequest {
    #[serde(default)]
    pub confirmation: String,
}

/// POST /api/v1/maintenance/clean-db
///
/// Irreversibly deletes every record. Refused unless the body carries the
/// exact confirmation phrase.
pub async fn clean_db(
    State(state): State<AppState>,
    Json(body): Json<CleanRequest>,
) -> Result<Json<Value>, ApiError> {
    if body.confirmation != WIPE_CONFIRMATION {
        return Err(ApiError::BadRequest(format!(
            "confirmation phrase mismatch, expected \"{}\"",
            WIPE_CONFIRMATION
        )));
    }
    let deleted = state.inventory.clear_all();
    tracing::warn!(?deleted, "Database wiped by maintenance request");
    state.persist();
    Ok(Json(json!({ "success": true, "deleted": deleted })))
}
