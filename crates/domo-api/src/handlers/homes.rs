//! Home CRUD handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use domo_core::{Home, HomeInput};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/v1/homes
pub async fn list_homes(State(state): State<AppState>) -> Json<Vec<Home>> {
    Json(state.inventory.list_homes())
}

/// POST /api/v1/homes
pub async fn create_home(
    State(state): State<AppState>,
    Json(input): Json<HomeInput>,
) -> Result<(StatusCode, Json<Home>), ApiError> {
    let home = state.inventory.create_home(input)?;
    state.persist();
    Ok((StatusCode::CREATED, Json(home)))
}

/// GET /api/v1/homes/{id}
pub async fn get_home(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Home>, ApiError> {
    Ok(Json(state.inventory.get_home(id)?))
}

/// PUT /api/v1/homes/{id}
pub async fn update_home(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<HomeInput>,
) -> Result<Json<Home>, ApiError> {
    let home = state.inventory.update_home(id, input)?;
    state.persist();
    Ok(Json(home))
}

/// DELETE /api/v1/homes/{id}
pub async fn delete_home(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state.inventory.delete_home(id)?;
    state.persist();
    Ok(Json(json!({ "result": "ok" })))
}
