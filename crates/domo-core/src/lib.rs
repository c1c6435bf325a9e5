//! domo-core - Core types and the naming engine for the device inventory
//!
//! This crate holds everything that is pure and shared: the entity models,
//! the slug/derived-field engine, the vocabulary normalizers, the generic
//! table sort utility, and the common error type. No I/O lives here.

pub mod error;
pub mod models;
pub mod naming;
pub mod sort;
pub mod vocab;

pub use error::{StoreError, StoreResult};
pub use models::*;
pub use naming::{
    build_http_from_ip, compute_derived_fields, sanitize_slug, DerivedFields, DeviceContext,
    NamingSettings,
};
pub use sort::{sort_rows, toggle_sort, SortDirection, SortState};
pub use vocab::{
    normalize_firmware, normalize_function, CanonicalFirmware, CanonicalFunction, Normalized,
};
