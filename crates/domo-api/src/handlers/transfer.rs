//! Bulk import / export handlers

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use domo_store::{export_rows, import_rows, DeviceRow, ImportReport};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/v1/import
///
/// Takes a batch of flat device rows and applies them, creating missing
/// hierarchy and catalog entries on the fly. Row failures are collected in
/// the report; the request itself succeeds unless the body is malformed.
pub async fn import_devices(
    State(state): State<AppState>,
    Json(rows): Json<Vec<DeviceRow>>,
) -> Result<Json<ImportReport>, ApiError> {
    if rows.is_empty() {
        return Err(ApiError::BadRequest("no rows to import".to_string()));
    }
    let report = import_rows(&state.inventory, &rows);
    state.persist();
    Ok(Json(report))
}

#[derive(Deserialize)]
pub struct ExportQuery {
    /// "json" (default) or "yaml"
    pub format: Option<String>,
}

/// GET /api/v1/export?format=json|yaml
pub async fn export_devices(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let rows = export_rows(&state.inventory);
    match query.format.as_deref() {
        None | Some("json") => Ok(Json(rows).into_response()),
        Some("yaml") => {
            let body = serde_yaml::to_string(&rows)
                .map_err(|err| ApiError::Internal(format!("yaml export failed: {}", err)))?;
            Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/yaml")],
                body,
            )
                .into_response())
        }
        Some(other) => Err(ApiError::BadRequest(format!(
            "unsupported export format: {}",
            other
        ))),
    }
}
