//! Generic in-memory table keyed by an auto-incremented id

use std::collections::BTreeMap;

use domo_core::{CatalogEntry, Device, Home, Level, Room};
use serde::{Deserialize, Serialize};

/// Anything stored in a [`Table`] exposes its primary key.
pub trait HasId {
    fn id(&self) -> i64;
}

impl HasId for Home {
    fn id(&self) -> i64 {
        self.id
    }
}

impl HasId for Level {
    fn id(&self) -> i64 {
        self.id
    }
}

impl HasId for Room {
    fn id(&self) -> i64 {
        self.id
    }
}

impl HasId for Device {
    fn id(&self) -> i64 {
        self.id
    }
}

impl HasId for CatalogEntry {
    fn id(&self) -> i64 {
        self.id
    }
}

/// An ordered id -> row map with an auto-increment counter.
///
/// Iteration order is ascending id, which is what every list endpoint
/// returns. The counter never reuses ids until [`Table::clear`] resets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T: HasId + Clone> Table<T> {
    /// Allocate the next primary key.
    pub fn next_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Insert or replace a row, keyed by its own id.
    pub fn put(&mut self, row: T) {
        self.rows.insert(row.id(), row);
    }

    pub fn get(&self, id: i64) -> Option<&T> {
        self.rows.get(&id)
    }

    pub fn remove(&mut self, id: i64) -> Option<T> {
        self.rows.remove(&id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.rows.contains_key(&id)
    }

    /// All rows in ascending id order.
    pub fn list(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Wipe the table and reset the id counter. Returns the removed count.
    pub fn clear(&mut self) -> usize {
        let n = self.rows.len();
        self.rows.clear();
        self.next_id = 1;
        n
    }
}
