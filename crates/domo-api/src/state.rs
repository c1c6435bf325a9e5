//! Application state for the inventory API

use std::path::PathBuf;
use std::sync::Arc;

use domo_store::Inventory;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// The inventory store
    pub inventory: Arc<Inventory>,
    /// Optional snapshot file written after successful mutations
    snapshot_path: Option<Arc<PathBuf>>,
}

impl AppState {
    /// Create a new AppState around an inventory, without persistence.
    pub fn new(inventory: Arc<Inventory>) -> Self {
        Self {
            inventory,
            snapshot_path: None,
        }
    }

    /// Create a new AppState that snapshots to `path` after mutations.
    pub fn with_snapshot(inventory: Arc<Inventory>, path: PathBuf) -> Self {
        Self {
            inventory,
            snapshot_path: Some(Arc::new(path)),
        }
    }

    /// Persist the inventory if a snapshot path is configured.
    ///
    /// Persistence failures are logged, never surfaced to the client: the
    /// mutation itself already succeeded in memory.
    pub fn persist(&self) {
        if let Some(path) = &self.snapshot_path {
            if let Err(err) = self.inventory.save_to_file(path) {
                tracing::error!(path = %path.display(), %err, "Failed to save snapshot");
            }
        }
    }
}
