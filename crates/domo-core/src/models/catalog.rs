//! Reference catalogs: device models, firmwares, and functions
//!
//! All three tables share the same shape, so a single record type covers
//! them; the store keeps one table per catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row in one of the reference catalogs (model / firmware / function).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: i64,
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_enabled() -> bool {
    true
}

/// Payload for creating or updating a catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogInput {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for CatalogInput {
    fn default() -> Self {
        Self {
            name: String::new(),
            enabled: true,
        }
    }
}
