//! Canonical vocabulary handler

use axum::Json;
use domo_core::{CanonicalFirmware, CanonicalFunction};
use serde::Serialize;

/// The two closed enumerations, for form dropdowns and import validators.
#[derive(Serialize)]
pub struct VocabularyResponse {
    pub functions: Vec<&'static str>,
    pub firmwares: Vec<&'static str>,
}

/// GET /api/v1/vocabulary
pub async fn get_vocabulary() -> Json<VocabularyResponse> {
    Json(VocabularyResponse {
        functions: CanonicalFunction::ALL.iter().map(|f| f.as_str()).collect(),
        firmwares: CanonicalFirmware::ALL.iter().map(|f| f.as_str()).collect(),
    })
}
