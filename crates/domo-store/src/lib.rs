//! domo-store - Thread-safe inventory store with snapshot persistence
//!
//! Keeps every entity table behind a single `RwLock` and rebuilds the joined
//! device views on each read. State can be snapshotted to (and reloaded
//! from) a JSON file; there is no database underneath.

pub mod inventory;
pub mod table;
pub mod transfer;

pub use inventory::{Catalog, HierarchyNode, HierarchyTree, Inventory, DEFAULT_SETTINGS};
pub use transfer::{export_rows, import_rows, DeviceRow, ImportReport, RowLog};
