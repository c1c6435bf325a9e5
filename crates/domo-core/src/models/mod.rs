//! Entity models for the device inventory
//!
//! Wire format is camelCase JSON throughout, matching what the table and
//! form components consume.

pub mod catalog;
pub mod device;
pub mod hierarchy;

pub use catalog::{CatalogEntry, CatalogInput};
pub use device::{Device, DeviceInput, DeviceView};
pub use hierarchy::{Home, HomeInput, Level, LevelInput, Room, RoomInput};

/// Maximum accepted length for any string field in a payload.
pub const MAX_FIELD_LEN: usize = 5_000;
