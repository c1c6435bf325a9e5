//! domo-api - REST API layer for the device inventory
//!
//! This crate provides the HTTP layer over `domo_store::Inventory`: one
//! handler module per resource, a shared `AppState`, and error conversion
//! to JSON responses.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use domo_api::{create_router, AppState};
//! use domo_store::Inventory;
//!
//! let state = AppState::new(Arc::new(Inventory::new()));
//! let router = create_router(state);
//! ```

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the inventory REST API router with the given application state
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(|| async { "OK" }))
        // Homes
        .route(
            "/api/v1/homes",
            get(handlers::homes::list_homes).post(handlers::homes::create_home),
        )
        .route(
            "/api/v1/homes/{id}",
            get(handlers::homes::get_home)
                .put(handlers::homes::update_home)
                .delete(handlers::homes::delete_home),
        )
        // Levels
        .route(
            "/api/v1/levels",
            get(handlers::levels::list_levels).post(handlers::levels::create_level),
        )
        .route(
            "/api/v1/levels/{id}",
            get(handlers::levels::get_level)
                .put(handlers::levels::update_level)
                .delete(handlers::levels::delete_level),
        )
        // Rooms
        .route(
            "/api/v1/rooms",
            get(handlers::rooms::list_rooms).post(handlers::rooms::create_room),
        )
        .route(
            "/api/v1/rooms/{id}",
            get(handlers::rooms::get_room)
                .put(handlers::rooms::update_room)
                .delete(handlers::rooms::delete_room),
        )
        // Devices
        .route(
            "/api/v1/devices",
            get(handlers::devices::list_devices).post(handlers::devices::create_device),
        )
        .route(
            "/api/v1/devices/{id}",
            get(handlers::devices::get_device)
                .put(handlers::devices::update_device)
                .delete(handlers::devices::delete_device),
        )
        // Reference catalogs
        .route(
            "/api/v1/models",
            get(handlers::catalogs::list_models).post(handlers::catalogs::create_model),
        )
        .route(
            "/api/v1/models/{id}",
            get(handlers::catalogs::get_model)
                .put(handlers::catalogs::update_model)
                .delete(handlers::catalogs::delete_model),
        )
        .route(
            "/api/v1/firmwares",
            get(handlers::catalogs::list_firmwares).post(handlers::catalogs::create_firmware),
        )
        .route(
            "/api/v1/firmwares/{id}",
            get(handlers::catalogs::get_firmware)
                .put(handlers::catalogs::update_firmware)
                .delete(handlers::catalogs::delete_firmware),
        )
        .route(
            "/api/v1/functions",
            get(handlers::catalogs::list_functions).post(handlers::catalogs::create_function),
        )
        .route(
            "/api/v1/functions/{id}",
            get(handlers::catalogs::get_function)
                .put(handlers::catalogs::update_function)
                .delete(handlers::catalogs::delete_function),
        )
        // Settings
        .route(
            "/api/v1/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        // Hierarchy tree
        .route("/api/v1/hierarchy", get(handlers::hierarchy::get_hierarchy))
        // Canonical vocabularies
        .route(
            "/api/v1/vocabulary",
            get(handlers::vocabulary::get_vocabulary),
        )
        // Import / export
        .route("/api/v1/import", post(handlers::transfer::import_devices))
        .route("/api/v1/export", get(handlers::transfer::export_devices))
        // Maintenance
        .route(
            "/api/v1/maintenance/stats",
            get(handlers::maintenance::get_stats),
        )
        .route(
            "/api/v1/maintenance/clean-db",
            post(handlers::maintenance::clean_db),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
