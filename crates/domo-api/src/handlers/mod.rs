//! HTTP request handlers for the inventory API
//!
//! One module per resource; all handlers go through `AppState` and the
//! shared `ApiError` conversion.

pub mod catalogs;
pub mod devices;
pub mod hierarchy;
pub mod homes;
pub mod levels;
pub mod maintenance;
pub mod rooms;
pub mod settings;
pub mod transfer;
pub mod vocabulary;
