//! Device CRUD handlers
//!
//! Device reads return the joined view with the computed naming fields.
//! The list endpoint supports the generic table sort over any response
//! column.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use domo_core::{sort_rows, DeviceInput, DeviceView, SortDirection, SortState};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct DeviceQuery {
    /// Restrict to devices of one room
    pub room_id: Option<i64>,
    /// Response column to sort by
    pub sort: Option<String>,
    /// "asc" (default) or "desc"
    pub dir: Option<String>,
}

/// GET /api/v1/devices?room_id=&sort=&dir=
pub async fn list_devices(
    State(state): State<AppState>,
    Query(query): Query<DeviceQuery>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let views = state.inventory.list_devices(query.room_id);
    let mut rows: Vec<Value> = views
        .into_iter()
        .map(|v| serde_json::to_value(v).unwrap_or(Value::Null))
        .collect();

    if let Some(key) = query.sort {
        let direction = match query.dir.as_deref() {
            None | Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            Some(other) => {
                return Err(ApiError::BadRequest(format!(
                    "invalid sort direction: {}",
                    other
                )))
            }
        };
        let sort = SortState {
            key: Some(key),
            direction,
        };
        sort_rows(&mut rows, &sort);
    }

    Ok(Json(rows))
}

/// POST /api/v1/devices
pub async fn create_device(
    State(state): State<AppState>,
    Json(input): Json<DeviceInput>,
) -> Result<(StatusCode, Json<DeviceView>), ApiError> {
    let view = state.inventory.create_device(input)?;
    state.persist();
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/devices/{id}
pub async fn get_device(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeviceView>, ApiError> {
    Ok(Json(state.inventory.get_device(id)?))
}

/// PUT /api/v1/devices/{id}
pub async fn update_device(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<DeviceInput>,
) -> Result<Json<DeviceView>, ApiError> {
    let view = state.inventory.update_device(id, input)?;
    state.persist();
    Ok(Json(view))
}

/// DELETE /api/v1/devices/{id}
pub async fn delete_device(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state.inventory.delete_device(id)?;
    state.persist();
    Ok(Json(json!({ "result": "ok" })))
}
