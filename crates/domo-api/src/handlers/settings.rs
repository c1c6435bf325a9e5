//! Settings handlers

use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/v1/settings
pub async fn get_settings(State(state): State<AppState>) -> Json<BTreeMap<String, String>> {
    Json(state.inventory.settings())
}

/// PUT /api/v1/settings
///
/// Accepts `{key: value}` pairs; values are stringified, unknown keys are
/// dropped by the store. Returns the full settings map after the update.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(body): Json<BTreeMap<String, Value>>,
) -> Result<Json<BTreeMap<String, String>>, ApiError> {
    let updates: BTreeMap<String, String> = body
        .into_iter()
        .map(|(k, v)| {
            let s = match v {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (k, s)
        })
        .collect();
    let settings = state.inventory.update_settings(updates)?;
    state.persist();
    Ok(Json(settings))
}
