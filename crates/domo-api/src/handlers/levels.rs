//! Level CRUD handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use domo_core::{Level, LevelInput};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LevelFilter {
    /// Restrict to levels of one home
    pub home_id: Option<i64>,
}

/// GET /api/v1/levels?home_id=
pub async fn list_levels(
    State(state): State<AppState>,
    Query(filter): Query<LevelFilter>,
) -> Json<Vec<Level>> {
    Json(state.inventory.list_levels(filter.home_id))
}

/// POST /api/v1/levels
pub async fn create_level(
    State(state): State<AppState>,
    Json(input): Json<LevelInput>,
) -> Result<(StatusCode, Json<Level>), ApiError> {
    let level = state.inventory.create_level(input)?;
    state.persist();
    Ok((StatusCode::CREATED, Json(level)))
}

/// GET /api/v1/levels/{id}
pub async fn get_level(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Level>, ApiError> {
    Ok(Json(state.inventory.get_level(id)?))
}

/// PUT /api/v1/levels/{id}
pub async fn update_level(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<LevelInput>,
) -> Result<Json<Level>, ApiError> {
    let level = state.inventory.update_level(id, input)?;
    state.persist();
    Ok(Json(level))
}

/// DELETE /api/v1/levels/{id}
pub async fn delete_level(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state.inventory.delete_level(id)?;
    state.persist();
    Ok(Json(json!({ "result": "ok" })))
}
