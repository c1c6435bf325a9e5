//! Reference catalog handlers (models / firmwares / functions)
//!
//! The three catalogs share one record shape, so the handlers delegate to
//! a common set of functions parameterized by `Catalog`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use domo_core::{CatalogEntry, CatalogInput};
use domo_store::Catalog;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

async fn list(state: AppState, which: Catalog) -> Json<Vec<CatalogEntry>> {
    Json(state.inventory.list_catalog(which))
}

async fn create(
    state: AppState,
    which: Catalog,
    input: CatalogInput,
) -> Result<(StatusCode, Json<CatalogEntry>), ApiError> {
    let entry = state.inventory.create_catalog(which, input)?;
    state.persist();
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn get(state: AppState, which: Catalog, id: i64) -> Result<Json<CatalogEntry>, ApiError> {
    Ok(Json(state.inventory.get_catalog(which, id)?))
}

async fn update(
    state: AppState,
    which: Catalog,
    id: i64,
    input: CatalogInput,
) -> Result<Json<CatalogEntry>, ApiError> {
    let entry = state.inventory.update_catalog(which, id, input)?;
    state.persist();
    Ok(Json(entry))
}

async fn delete(state: AppState, which: Catalog, id: i64) -> Result<Json<Value>, ApiError> {
    state.inventory.delete_catalog(which, id)?;
    state.persist();
    Ok(Json(json!({ "result": "ok" })))
}

macro_rules! catalog_handlers {
    ($catalog:expr, $list:ident, $create:ident, $get:ident, $update:ident, $delete:ident) => {
        pub async fn $list(State(state): State<AppState>) -> Json<Vec<CatalogEntry>> {
            list(state, $catalog).await
        }

        pub async fn $create(
            State(state): State<AppState>,
            Json(input): Json<CatalogInput>,
        ) -> Result<(StatusCode, Json<CatalogEntry>), ApiError> {
            create(state, $catalog, input).await
        }

        pub async fn $get(
            State(state): State<AppState>,
            Path(id): Path<i64>,
        ) -> Result<Json<CatalogEntry>, ApiError> {
            get(state, $catalog, id).await
        }

        pub async fn $update(
            State(state): State<AppState>,
            Path(id): Path<i64>,
            Json(input): Json<CatalogInput>,
        ) -> Result<Json<CatalogEntry>, ApiError> {
            update(state, $catalog, id, input).await
        }

        pub async fn $delete(
            State(state): State<AppState>,
            Path(id): Path<i64>,
        ) -> Result<Json<Value>, ApiError> {
            delete(state, $catalog, id).await
        }
    };
}

catalog_handlers!(
    Catalog::Model,
    list_models,
    create_model,
    get_model,
    update_model,
    delete_model
);

catalog_handlers!(
    Catalog::Firmware,
    list_firmwares,
    create_firmware,
    get_firmware,
    update_firmware,
    delete_firmware
);

catalog_handlers!(
    Catalog::Function,
    list_functions,
    create_function,
    get_function,
    update_function,
    delete_function
);
