//! Room CRUD handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use domo_core::{Room, RoomInput};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RoomFilter {
    /// Restrict to rooms of one level
    pub level_id: Option<i64>,
}

/// GET /api/v1/rooms?level_id=
pub async fn list_rooms(
    State(state): State<AppState>,
    Query(filter): Query<RoomFilter>,
) -> Json<Vec<Room>> {
    Json(state.inventory.list_rooms(filter.level_id))
}

/// POST /api/v1/rooms
pub async fn create_room(
    State(state): State<AppState>,
    Json(input): Json<RoomInput>,
) -> Result<(StatusCode, Json<Room>), ApiError> {
    let room = state.inventory.create_room(input)?;
    state.persist();
    Ok((StatusCode::CREATED, Json(room)))
}

/// GET /api/v1/rooms/{id}
pub async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Room>, ApiError> {
    Ok(Json(state.inventory.get_room(id)?))
}

/// PUT /api/v1/rooms/{id}
pub async fn update_room(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<RoomInput>,
) -> Result<Json<Room>, ApiError> {
    let room = state.inventory.update_room(id, input)?;
    state.persist();
    Ok(Json(room))
}

/// DELETE /api/v1/rooms/{id}
pub async fn delete_room(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state.inventory.delete_room(id)?;
    state.persist();
    Ok(Json(json!({ "result": "ok" })))
}
