//! Hierarchy tree handler

use axum::extract::State;
use axum::Json;
use domo_store::HierarchyTree;

use crate::state::AppState;

/// GET /api/v1/hierarchy
///
/// The full home -> level -> room tree with per-node device counts and a
/// grand total, ready for a tree view.
pub async fn get_hierarchy(State(state): State<AppState>) -> Json<HierarchyTree> {
    Json(state.inventory.hierarchy())
}
