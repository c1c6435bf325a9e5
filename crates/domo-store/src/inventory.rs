//! The inventory: every entity table behind one lock
//!
//! All mutations validate referential integrity and uniqueness before
//! touching state, so a failed call leaves the inventory unchanged.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use domo_core::{
    sanitize_slug, CatalogEntry, CatalogInput, Device, DeviceInput, DeviceView, Home, HomeInput,
    Level, LevelInput, NamingSettings, Room, RoomInput, StoreError, StoreResult, MAX_FIELD_LEN,
};

use crate::table::Table;

/// Seeded application settings. Unknown keys are rejected on write.
pub const DEFAULT_SETTINGS: [(&str, &str); 4] = [
    ("ip_prefix", "192.168.0"),
    ("dns_suffix", "local"),
    ("mqtt_topic_prefix", "home"),
    ("default_home_name", "Home"),
];

/// Which reference catalog an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Catalog {
    Model,
    Firmware,
    Function,
}

impl Catalog {
    /// Entity kind used in error messages and stats.
    pub fn kind(self) -> &'static str {
        match self {
            Catalog::Model => "model",
            Catalog::Firmware => "firmware",
            Catalog::Function => "function",
        }
    }
}

/// One node of the hierarchy tree (home, level, or room).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyNode {
    #[serde(rename = "type")]
    pub node_type: String,
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image: String,
    pub device_count: usize,
    pub children: Vec<HierarchyNode>,
}

/// The full home -> level -> room tree with device counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyTree {
    pub homes: Vec<HierarchyNode>,
    pub total_devices: usize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct State {
    homes: Table<Home>,
    levels: Table<Level>,
    rooms: Table<Room>,
    devices: Table<Device>,
    models: Table<CatalogEntry>,
    firmwares: Table<CatalogEntry>,
    functions: Table<CatalogEntry>,
    settings: BTreeMap<String, String>,
}

impl State {
    fn catalog(&self, which: Catalog) -> &Table<CatalogEntry> {
        match which {
            Catalog::Model => &self.models,
            Catalog::Firmware => &self.firmwares,
            Catalog::Function => &self.functions,
        }
    }

    fn catalog_mut(&mut self, which: Catalog) -> &mut Table<CatalogEntry> {
        match which {
            Catalog::Model => &mut self.models,
            Catalog::Firmware => &mut self.firmwares,
            Catalog::Function => &mut self.functions,
        }
    }

    fn seed_settings(&mut self) {
        for (key, value) in DEFAULT_SETTINGS {
            self.settings
                .entry(key.to_string())
                .or_insert_with(|| value.to_string());
        }
    }

    fn naming_settings(&self) -> NamingSettings {
        let get = |key: &str, fallback: &str| {
            self.settings
                .get(key)
                .cloned()
                .unwrap_or_else(|| fallback.to_string())
        };
        NamingSettings {
            ip_prefix: get("ip_prefix", "192.168.0"),
            dns_suffix: get("dns_suffix", "local"),
            mqtt_topic_prefix: get("mqtt_topic_prefix", "home"),
            default_home_name: get("default_home_name", "Home"),
        }
    }

    /// Join a device with its related names and compute the derived fields.
    fn view(&self, device: Device, settings: &NamingSettings) -> DeviceView {
        let room = self.rooms.get(device.room_id);
        let level = room.and_then(|r| self.levels.get(r.level_id));
        let home = level.and_then(|l| self.homes.get(l.home_id));
        let model = self.models.get(device.model_id);
        let firmware = self.firmwares.get(device.firmware_id);
        let function = self.functions.get(device.function_id);
        let target_mac = device
            .target_id
            .and_then(|tid| self.devices.get(tid))
            .map(|t| t.mac.clone());

        DeviceView::assemble(
            device,
            room.map(|r| (r.name.as_str(), r.slug.as_str())),
            level.map(|l| (l.name.as_str(), l.slug.as_str())),
            home.map(|h| h.name.as_str()),
            model.map(|m| m.name.as_str()),
            firmware.map(|f| f.name.as_str()),
            function.map(|f| f.name.as_str()),
            target_mac.as_deref(),
            settings,
        )
    }
}

fn check_len(field: &str, value: &str) -> StoreResult<()> {
    if value.len() > MAX_FIELD_LEN {
        return Err(StoreError::InvalidInput(format!(
            "field '{}' exceeds maximum length ({})",
            field, MAX_FIELD_LEN
        )));
    }
    Ok(())
}

fn require(field: &str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::InvalidInput(format!("{} is required", field)));
    }
    Ok(())
}

/// Blank strings become `None` so that nullable columns stay nullable and
/// the unique-ip check never trips on empty strings.
fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Slug from the explicit value, falling back to the display name.
fn slug_for(slug: &str, name: &str) -> String {
    let s = sanitize_slug(slug);
    if s.is_empty() {
        sanitize_slug(name)
    } else {
        s
    }
}

/// Thread-safe inventory of the whole device hierarchy.
#[derive(Debug, Default)]
pub struct Inventory {
    state: RwLock<State>,
}

impl Inventory {
    /// Create an empty inventory with seeded settings.
    pub fn new() -> Self {
        let inv = Self::default();
        inv.state.write().seed_settings();
        inv
    }

    // ------------------------------------------------------------------
    // Snapshot persistence
    // ------------------------------------------------------------------

    /// Load a previously saved snapshot.
    pub fn load_from_file(path: &Path) -> StoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut state: State = serde_json::from_str(&content)?;
        state.seed_settings();
        tracing::info!(
            path = %path.display(),
            devices = state.devices.len(),
            "Loaded inventory snapshot"
        );
        Ok(Self {
            state: RwLock::new(state),
        })
    }

    /// Write the full state to a JSON snapshot file.
    pub fn save_to_file(&self, path: &Path) -> StoreResult<()> {
        let json = {
            let state = self.state.read();
            serde_json::to_string_pretty(&*state)?
        };
        std::fs::write(path, json)?;
        tracing::debug!(path = %path.display(), "Saved inventory snapshot");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// All settings, with defaults seeded for missing keys.
    pub fn settings(&self) -> BTreeMap<String, String> {
        let mut state = self.state.write();
        state.seed_settings();
        state.settings.clone()
    }

    /// Update settings from `{key: value}` pairs. Only known keys are
    /// accepted; the full map is returned after the update.
    pub fn update_settings(
        &self,
        updates: BTreeMap<String, String>,
    ) -> StoreResult<BTreeMap<String, String>> {
        let filtered: BTreeMap<String, String> = updates
            .into_iter()
            .filter(|(k, _)| DEFAULT_SETTINGS.iter().any(|(known, _)| known == k))
            .collect();
        if filtered.is_empty() {
            return Err(StoreError::InvalidInput(
                "no valid setting keys provided".to_string(),
            ));
        }
        for value in filtered.values() {
            check_len("setting", value)?;
        }
        let mut state = self.state.write();
        let keys: Vec<&String> = filtered.keys().collect();
        tracing::info!(?keys, "Settings updated");
        state.settings.extend(filtered);
        state.seed_settings();
        Ok(state.settings.clone())
    }

    /// The naming parameters derived from current settings.
    pub fn naming_settings(&self) -> NamingSettings {
        self.state.read().naming_settings()
    }

    // ------------------------------------------------------------------
    // Homes
    // ------------------------------------------------------------------

    pub fn list_homes(&self) -> Vec<Home> {
        self.state.read().homes.list()
    }

    pub fn get_home(&self, id: i64) -> StoreResult<Home> {
        self.state
            .read()
            .homes
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound { kind: "home", id })
    }

    pub fn create_home(&self, input: HomeInput) -> StoreResult<Home> {
        validate_place_input(&input.name, &input.slug, &input.description, &input.image)?;
        let mut state = self.state.write();
        let now = Utc::now();
        let home = Home {
            id: state.homes.next_id(),
            slug: slug_for(&input.slug, &input.name),
            name: input.name,
            description: input.description,
            image: input.image,
            created_at: now,
            updated_at: now,
        };
        state.homes.put(home.clone());
        tracing::debug!(id = home.id, slug = %home.slug, "Created home");
        Ok(home)
    }

    pub fn update_home(&self, id: i64, input: HomeInput) -> StoreResult<Home> {
        validate_place_input(&input.name, &input.slug, &input.description, &input.image)?;
        let mut state = self.state.write();
        let mut home = state
            .homes
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound { kind: "home", id })?;
        home.slug = slug_for(&input.slug, &input.name);
        home.name = input.name;
        home.description = input.description;
        home.image = input.image;
        home.updated_at = Utc::now();
        state.homes.put(home.clone());
        Ok(home)
    }

    pub fn delete_home(&self, id: i64) -> StoreResult<()> {
        let mut state = self.state.write();
        if !state.homes.contains(id) {
            return Err(StoreError::NotFound { kind: "home", id });
        }
        if state.levels.iter().any(|l| l.home_id == id) {
            return Err(StoreError::Conflict(
                "home still contains levels".to_string(),
            ));
        }
        state.homes.remove(id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Levels
    // ------------------------------------------------------------------

    pub fn list_levels(&self, home_id: Option<i64>) -> Vec<Level> {
        let state = self.state.read();
        state
            .levels
            .iter()
            .filter(|l| home_id.is_none_or(|hid| l.home_id == hid))
            .cloned()
            .collect()
    }

    pub fn get_level(&self, id: i64) -> StoreResult<Level> {
        self.state
            .read()
            .levels
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound { kind: "level", id })
    }

    pub fn create_level(&self, input: LevelInput) -> StoreResult<Level> {
        validate_place_input(&input.name, &input.slug, &input.description, &input.image)?;
        let mut state = self.state.write();
        if !state.homes.contains(input.home_id) {
            return Err(StoreError::InvalidInput(format!(
                "home {} does not exist",
                input.home_id
            )));
        }
        let now = Utc::now();
        let level = Level {
            id: state.levels.next_id(),
            home_id: input.home_id,
            slug: slug_for(&input.slug, &input.name),
            name: input.name,
            description: input.description,
            image: input.image,
            created_at: now,
            updated_at: now,
        };
        state.levels.put(level.clone());
        tracing::debug!(id = level.id, slug = %level.slug, "Created level");
        Ok(level)
    }

    pub fn update_level(&self, id: i64, input: LevelInput) -> StoreResult<Level> {
        validate_place_input(&input.name, &input.slug, &input.description, &input.image)?;
        let mut state = self.state.write();
        if !state.homes.contains(input.home_id) {
            return Err(StoreError::InvalidInput(format!(
                "home {} does not exist",
                input.home_id
            )));
        }
        let mut level = state
            .levels
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound { kind: "level", id })?;
        level.home_id = input.home_id;
        level.slug = slug_for(&input.slug, &input.name);
        level.name = input.name;
        level.description = input.description;
        level.image = input.image;
        level.updated_at = Utc::now();
        state.levels.put(level.clone());
        Ok(level)
    }

    pub fn delete_level(&self, id: i64) -> StoreResult<()> {
        let mut state = self.state.write();
        if !state.levels.contains(id) {
            return Err(StoreError::NotFound { kind: "level", id });
        }
        if state.rooms.iter().any(|r| r.level_id == id) {
            return Err(StoreError::Conflict(
                "level still contains rooms".to_string(),
            ));
        }
        state.levels.remove(id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Rooms
    // ------------------------------------------------------------------

    pub fn list_rooms(&self, level_id: Option<i64>) -> Vec<Room> {
        let state = self.state.read();
        state
            .rooms
            .iter()
            .filter(|r| level_id.is_none_or(|lid| r.level_id == lid))
            .cloned()
            .collect()
    }

    pub fn get_room(&self, id: i64) -> StoreResult<Room> {
        self.state
            .read()
            .rooms
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound { kind: "room", id })
    }

    pub fn create_room(&self, input: RoomInput) -> StoreResult<Room> {
        validate_place_input(&input.name, &input.slug, &input.description, &input.image)?;
        let mut state = self.state.write();
        if !state.levels.contains(input.level_id) {
            return Err(StoreError::InvalidInput(format!(
                "level {} does not exist",
                input.level_id
            )));
        }
        let now = Utc::now();
        let room = Room {
            id: state.rooms.next_id(),
            level_id: input.level_id,
            slug: slug_for(&input.slug, &input.name),
            name: input.name,
            description: input.description,
            image: input.image,
            created_at: now,
            updated_at: now,
        };
        state.rooms.put(room.clone());
        tracing::debug!(id = room.id, slug = %room.slug, "Created room");
        Ok(room)
    }

    pub fn update_room(&self, id: i64, input: RoomInput) -> StoreResult<Room> {
        validate_place_input(&input.name, &input.slug, &input.description, &input.image)?;
        let mut state = self.state.write();
        if !state.levels.contains(input.level_id) {
            return Err(StoreError::InvalidInput(format!(
                "level {} does not exist",
                input.level_id
            )));
        }
        let mut room = state
            .rooms
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound { kind: "room", id })?;
        room.level_id = input.level_id;
        room.slug = slug_for(&input.slug, &input.name);
        room.name = input.name;
        room.description = input.description;
        room.image = input.image;
        room.updated_at = Utc::now();
        state.rooms.put(room.clone());
        Ok(room)
    }

    pub fn delete_room(&self, id: i64) -> StoreResult<()> {
        let mut state = self.state.write();
        if !state.rooms.contains(id) {
            return Err(StoreError::NotFound { kind: "room", id });
        }
        if state.devices.iter().any(|d| d.room_id == id) {
            return Err(StoreError::Conflict(
                "room still contains devices".to_string(),
            ));
        }
        state.rooms.remove(id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Catalogs (models / firmwares / functions)
    // ------------------------------------------------------------------

    pub fn list_catalog(&self, which: Catalog) -> Vec<CatalogEntry> {
        self.state.read().catalog(which).list()
    }

    pub fn get_catalog(&self, which: Catalog, id: i64) -> StoreResult<CatalogEntry> {
        self.state
            .read()
            .catalog(which)
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound {
                kind: which.kind(),
                id,
            })
    }

    pub fn create_catalog(&self, which: Catalog, input: CatalogInput) -> StoreResult<CatalogEntry> {
        require("name", &input.name)?;
        check_len("name", &input.name)?;
        let mut state = self.state.write();
        let now = Utc::now();
        let table = state.catalog_mut(which);
        let entry = CatalogEntry {
            id: table.next_id(),
            name: input.name,
            enabled: input.enabled,
            created_at: now,
            updated_at: now,
        };
        table.put(entry.clone());
        tracing::debug!(kind = which.kind(), id = entry.id, name = %entry.name, "Created catalog entry");
        Ok(entry)
    }

    pub fn update_catalog(
        &self,
        which: Catalog,
        id: i64,
        input: CatalogInput,
    ) -> StoreResult<CatalogEntry> {
        require("name", &input.name)?;
        check_len("name", &input.name)?;
        let mut state = self.state.write();
        let table = state.catalog_mut(which);
        let mut entry = table.get(id).cloned().ok_or(StoreError::NotFound {
            kind: which.kind(),
            id,
        })?;
        entry.name = input.name;
        entry.enabled = input.enabled;
        entry.updated_at = Utc::now();
        table.put(entry.clone());
        Ok(entry)
    }

    pub fn delete_catalog(&self, which: Catalog, id: i64) -> StoreResult<()> {
        let mut state = self.state.write();
        if !state.catalog(which).contains(id) {
            return Err(StoreError::NotFound {
                kind: which.kind(),
                id,
            });
        }
        let referenced = state.devices.iter().any(|d| match which {
            Catalog::Model => d.model_id == id,
            Catalog::Firmware => d.firmware_id == id,
            Catalog::Function => d.function_id == id,
        });
        if referenced {
            return Err(StoreError::Conflict(format!(
                "{} is still referenced by devices",
                which.kind()
            )));
        }
        state.catalog_mut(which).remove(id);
        Ok(())
    }

    /// Look up a catalog entry by exact name.
    pub fn find_catalog_by_name(&self, which: Catalog, name: &str) -> Option<CatalogEntry> {
        self.state
            .read()
            .catalog(which)
            .iter()
            .find(|e| e.name == name)
            .cloned()
    }

    // ------------------------------------------------------------------
    // Devices
    // ------------------------------------------------------------------

    pub fn list_devices(&self, room_id: Option<i64>) -> Vec<DeviceView> {
        let state = self.state.read();
        let settings = state.naming_settings();
        state
            .devices
            .iter()
            .filter(|d| room_id.is_none_or(|rid| d.room_id == rid))
            .cloned()
            .map(|d| state.view(d, &settings))
            .collect()
    }

    pub fn get_device(&self, id: i64) -> StoreResult<DeviceView> {
        let state = self.state.read();
        let device = state
            .devices
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound { kind: "device", id })?;
        let settings = state.naming_settings();
        Ok(state.view(device, &settings))
    }

    pub fn find_device_by_mac(&self, mac: &str) -> Option<Device> {
        self.state
            .read()
            .devices
            .iter()
            .find(|d| d.mac == mac)
            .cloned()
    }

    pub fn create_device(&self, input: DeviceInput) -> StoreResult<DeviceView> {
        let input = normalize_device_input(input);
        validate_device_input(&input)?;
        let mut state = self.state.write();
        check_device_references(&state, &input, None)?;
        let now = Utc::now();
        let device = Device {
            id: state.devices.next_id(),
            mac: input.mac,
            ip: input.ip,
            enabled: input.enabled,
            position_slug: slug_for(&input.position_slug, &input.position_name),
            position_name: input.position_name,
            mode: input.mode,
            interlock: input.interlock,
            ha_device_class: input.ha_device_class,
            extra: input.extra,
            room_id: input.room_id,
            model_id: input.model_id,
            firmware_id: input.firmware_id,
            function_id: input.function_id,
            target_id: input.target_id,
            created_at: now,
            updated_at: now,
        };
        state.devices.put(device.clone());
        tracing::debug!(id = device.id, mac = %device.mac, "Created device");
        let settings = state.naming_settings();
        Ok(state.view(device, &settings))
    }

    pub fn update_device(&self, id: i64, input: DeviceInput) -> StoreResult<DeviceView> {
        let input = normalize_device_input(input);
        validate_device_input(&input)?;
        let mut state = self.state.write();
        if !state.devices.contains(id) {
            return Err(StoreError::NotFound { kind: "device", id });
        }
        check_device_references(&state, &input, Some(id))?;
        let mut device = state
            .devices
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound { kind: "device", id })?;
        device.mac = input.mac;
        device.ip = input.ip;
        device.enabled = input.enabled;
        device.position_slug = slug_for(&input.position_slug, &input.position_name);
        device.position_name = input.position_name;
        device.mode = input.mode;
        device.interlock = input.interlock;
        device.ha_device_class = input.ha_device_class;
        device.extra = input.extra;
        device.room_id = input.room_id;
        device.model_id = input.model_id;
        device.firmware_id = input.firmware_id;
        device.function_id = input.function_id;
        device.target_id = input.target_id;
        device.updated_at = Utc::now();
        state.devices.put(device.clone());
        let settings = state.naming_settings();
        Ok(state.view(device, &settings))
    }

    pub fn delete_device(&self, id: i64) -> StoreResult<()> {
        let mut state = self.state.write();
        if state.devices.remove(id).is_none() {
            return Err(StoreError::NotFound { kind: "device", id });
        }
        // Detach any device that pointed at the deleted one.
        let orphans: Vec<Device> = state
            .devices
            .iter()
            .filter(|d| d.target_id == Some(id))
            .cloned()
            .collect();
        for mut d in orphans {
            d.target_id = None;
            state.devices.put(d);
        }
        Ok(())
    }

    /// Set a device's target link without revalidating the whole payload.
    pub fn set_device_target(&self, id: i64, target_id: Option<i64>) -> StoreResult<()> {
        let mut state = self.state.write();
        if let Some(tid) = target_id {
            if !state.devices.contains(tid) {
                return Err(StoreError::InvalidInput(format!(
                    "target device {} does not exist",
                    tid
                )));
            }
        }
        let mut device = state
            .devices
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound { kind: "device", id })?;
        device.target_id = target_id;
        device.updated_at = Utc::now();
        state.devices.put(device);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Hierarchy helpers
    // ------------------------------------------------------------------

    /// Find a level by slug within a home.
    pub fn find_level_by_slug(&self, home_id: i64, slug: &str) -> Option<Level> {
        self.state
            .read()
            .levels
            .iter()
            .find(|l| l.home_id == home_id && l.slug == slug)
            .cloned()
    }

    /// Find a room by slug within a level.
    pub fn find_room_by_slug(&self, level_id: i64, slug: &str) -> Option<Room> {
        self.state
            .read()
            .rooms
            .iter()
            .find(|r| r.level_id == level_id && r.slug == slug)
            .cloned()
    }

    /// Find a home by exact name.
    pub fn find_home_by_name(&self, name: &str) -> Option<Home> {
        self.state
            .read()
            .homes
            .iter()
            .find(|h| h.name == name)
            .cloned()
    }

    /// Build the full home -> level -> room tree with device counts.
    pub fn hierarchy(&self) -> HierarchyTree {
        let state = self.state.read();

        let mut per_room: BTreeMap<i64, usize> = BTreeMap::new();
        for device in state.devices.iter() {
            *per_room.entry(device.room_id).or_default() += 1;
        }

        let mut total = 0usize;
        let mut homes = Vec::new();
        for home in state.homes.iter() {
            let mut home_count = 0usize;
            let mut level_nodes = Vec::new();
            for level in state.levels.iter().filter(|l| l.home_id == home.id) {
                let mut level_count = 0usize;
                let mut room_nodes = Vec::new();
                for room in state.rooms.iter().filter(|r| r.level_id == level.id) {
                    let count = per_room.get(&room.id).copied().unwrap_or(0);
                    level_count += count;
                    room_nodes.push(HierarchyNode {
                        node_type: "room".to_string(),
                        id: room.id,
                        name: room.name.clone(),
                        slug: room.slug.clone(),
                        description: room.description.clone(),
                        image: room.image.clone(),
                        device_count: count,
                        children: Vec::new(),
                    });
                }
                home_count += level_count;
                level_nodes.push(HierarchyNode {
                    node_type: "level".to_string(),
                    id: level.id,
                    name: level.name.clone(),
                    slug: level.slug.clone(),
                    description: level.description.clone(),
                    image: level.image.clone(),
                    device_count: level_count,
                    children: room_nodes,
                });
            }
            total += home_count;
            homes.push(HierarchyNode {
                node_type: "home".to_string(),
                id: home.id,
                name: home.name.clone(),
                slug: home.slug.clone(),
                description: home.description.clone(),
                image: home.image.clone(),
                device_count: home_count,
                children: level_nodes,
            });
        }

        HierarchyTree {
            homes,
            total_devices: total,
        }
    }

    // ------------------------------------------------------------------
    // Maintenance
    // ------------------------------------------------------------------

    /// Row counts per table.
    pub fn stats(&self) -> BTreeMap<&'static str, usize> {
        let state = self.state.read();
        BTreeMap::from([
            ("homes", state.homes.len()),
            ("levels", state.levels.len()),
            ("rooms", state.rooms.len()),
            ("devices", state.devices.len()),
            ("models", state.models.len()),
            ("firmwares", state.firmwares.len()),
            ("functions", state.functions.len()),
        ])
    }

    /// Wipe every table (children first) and reset the id counters.
    /// Settings survive. Returns the per-table deletion counts.
    pub fn clear_all(&self) -> BTreeMap<&'static str, usize> {
        let mut state = self.state.write();
        let counts = BTreeMap::from([
            ("devices", state.devices.clear()),
            ("rooms", state.rooms.clear()),
            ("levels", state.levels.clear()),
            ("homes", state.homes.clear()),
            ("models", state.models.clear()),
            ("firmwares", state.firmwares.clear()),
            ("functions", state.functions.clear()),
        ]);
        tracing::warn!(?counts, "Inventory cleared");
        counts
    }
}

fn validate_place_input(name: &str, slug: &str, description: &str, image: &str) -> StoreResult<()> {
    require("name", name)?;
    check_len("name", name)?;
    check_len("slug", slug)?;
    check_len("description", description)?;
    check_len("image", image)?;
    Ok(())
}

fn normalize_device_input(mut input: DeviceInput) -> DeviceInput {
    input.mac = input.mac.trim().to_string();
    input.ip = blank_to_none(input.ip);
    input.mode = blank_to_none(input.mode);
    input.interlock = blank_to_none(input.interlock);
    input.ha_device_class = blank_to_none(input.ha_device_class);
    input.extra = blank_to_none(input.extra);
    input
}

fn validate_device_input(input: &DeviceInput) -> StoreResult<()> {
    require("mac", &input.mac)?;
    check_len("mac", &input.mac)?;
    check_len("positionName", &input.position_name)?;
    check_len("positionSlug", &input.position_slug)?;
    for (field, value) in [
        ("ip", &input.ip),
        ("mode", &input.mode),
        ("interlock", &input.interlock),
        ("haDeviceClass", &input.ha_device_class),
        ("extra", &input.extra),
    ] {
        if let Some(v) = value {
            check_len(field, v)?;
        }
    }
    Ok(())
}

/// Foreign-key and uniqueness checks for a device payload.
/// `current_id` is `Some` on update so the device doesn't collide with
/// itself.
fn check_device_references(
    state: &State,
    input: &DeviceInput,
    current_id: Option<i64>,
) -> StoreResult<()> {
    if !state.rooms.contains(input.room_id) {
        return Err(StoreError::InvalidInput(format!(
            "room {} does not exist",
            input.room_id
        )));
    }
    if !state.models.contains(input.model_id) {
        return Err(StoreError::InvalidInput(format!(
            "model {} does not exist",
            input.model_id
        )));
    }
    if !state.firmwares.contains(input.firmware_id) {
        return Err(StoreError::InvalidInput(format!(
            "firmware {} does not exist",
            input.firmware_id
        )));
    }
    if !state.functions.contains(input.function_id) {
        return Err(StoreError::InvalidInput(format!(
            "function {} does not exist",
            input.function_id
        )));
    }
    if let Some(target_id) = input.target_id {
        if Some(target_id) == current_id {
            return Err(StoreError::InvalidInput(
                "device cannot target itself".to_string(),
            ));
        }
        if !state.devices.contains(target_id) {
            return Err(StoreError::InvalidInput(format!(
                "target device {} does not exist",
                target_id
            )));
        }
    }

    let clash = state.devices.iter().any(|d| {
        Some(d.id) != current_id
            && (d.mac == input.mac || (input.ip.is_some() && d.ip == input.ip))
    });
    if clash {
        return Err(StoreError::Conflict(format!(
            "a device with the same mac or ip already exists (mac: {})",
            input.mac
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn seeded() -> (Inventory, i64, i64, i64, i64, i64) {
        let inv = Inventory::new();
        let home = inv
            .create_home(HomeInput {
                name: "Main House".to_string(),
                ..Default::default()
            })
            .unwrap();
        let level = inv
            .create_level(LevelInput {
                home_id: home.id,
                name: "Level 1".to_string(),
                slug: "l1".to_string(),
                ..Default::default()
            })
            .unwrap();
        let room = inv
            .create_room(RoomInput {
                level_id: level.id,
                name: "Kitchen".to_string(),
                ..Default::default()
            })
            .unwrap();
        let model = inv
            .create_catalog(
                Catalog::Model,
                CatalogInput {
                    name: "Shelly 1".to_string(),
                    enabled: true,
                },
            )
            .unwrap();
        let firmware = inv
            .create_catalog(
                Catalog::Firmware,
                CatalogInput {
                    name: "tasmota".to_string(),
                    enabled: true,
                },
            )
            .unwrap();
        let function = inv
            .create_catalog(
                Catalog::Function,
                CatalogInput {
                    name: "light".to_string(),
                    enabled: true,
                },
            )
            .unwrap();
        (inv, room.id, model.id, firmware.id, function.id, home.id)
    }

    fn device_input(room: i64, model: i64, firmware: i64, function: i64) -> DeviceInput {
        DeviceInput {
            mac: "AA:BB:CC:DD:EE:01".to_string(),
            ip: Some("77".to_string()),
            position_name: "Ceiling".to_string(),
            room_id: room,
            model_id: model,
            firmware_id: firmware,
            function_id: function,
            enabled: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_home_slug_defaults_from_name() {
        let inv = Inventory::new();
        let home = inv
            .create_home(HomeInput {
                name: "Main House".to_string(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(home.slug, "main-house");
    }

    #[test]
    fn test_create_device_and_view_computes_fields() {
        let (inv, room, model, firmware, function, _) = seeded();
        let view = inv
            .create_device(device_input(room, model, firmware, function))
            .unwrap();
        assert_eq!(view.computed.hostname.as_deref(), Some("l1_kitchen_light_ceiling"));
        assert_eq!(
            view.computed.mqtt_topic.as_deref(),
            Some("home/l1/kitchen/light/ceiling")
        );
        assert_eq!(
            view.computed.fqdn.as_deref(),
            Some("l1_kitchen_light_ceiling.local")
        );
        assert_eq!(view.computed.hostname_len, Some(24));
        assert_eq!(view.computed.link.as_deref(), Some("http://192.168.0.77/"));
        assert_eq!(view.room_slug.as_deref(), Some("kitchen"));
        assert_eq!(view.function_name.as_deref(), Some("light"));
    }

    #[test]
    fn test_malicious_ip_yields_no_link() {
        let (inv, room, model, firmware, function, _) = seeded();
        let mut input = device_input(room, model, firmware, function);
        input.ip = Some("javascript:alert(1)".to_string());
        let view = inv.create_device(input).unwrap();
        assert_eq!(view.computed.link, None);
    }

    #[test]
    fn test_duplicate_mac_rejected() {
        let (inv, room, model, firmware, function, _) = seeded();
        inv.create_device(device_input(room, model, firmware, function))
            .unwrap();
        let mut dup = device_input(room, model, firmware, function);
        dup.ip = Some("78".to_string());
        let err = inv.create_device(dup).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn test_duplicate_ip_rejected_but_absent_ip_is_fine() {
        let (inv, room, model, firmware, function, _) = seeded();
        inv.create_device(device_input(room, model, firmware, function))
            .unwrap();

        let mut dup_ip = device_input(room, model, firmware, function);
        dup_ip.mac = "AA:BB:CC:DD:EE:02".to_string();
        let err = inv.create_device(dup_ip).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // Two devices without an ip never collide.
        for n in [3, 4] {
            let mut no_ip = device_input(room, model, firmware, function);
            no_ip.mac = format!("AA:BB:CC:DD:EE:0{}", n);
            no_ip.ip = Some("  ".to_string());
            inv.create_device(no_ip).unwrap();
        }
    }

    #[test]
    fn test_unknown_foreign_key_rejected() {
        let (inv, _, model, firmware, function, _) = seeded();
        let err = inv
            .create_device(device_input(999, model, firmware, function))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
    }

    #[test]
    fn test_delete_room_with_devices_conflicts() {
        let (inv, room, model, firmware, function, home) = seeded();
        inv.create_device(device_input(room, model, firmware, function))
            .unwrap();
        assert!(matches!(
            inv.delete_room(room).unwrap_err(),
            StoreError::Conflict(_)
        ));
        assert!(matches!(
            inv.delete_home(home).unwrap_err(),
            StoreError::Conflict(_)
        ));
    }

    #[test]
    fn test_delete_device_detaches_targets() {
        let (inv, room, model, firmware, function, _) = seeded();
        let a = inv
            .create_device(device_input(room, model, firmware, function))
            .unwrap();
        let mut b_input = device_input(room, model, firmware, function);
        b_input.mac = "AA:BB:CC:DD:EE:02".to_string();
        b_input.ip = None;
        b_input.target_id = Some(a.device.id);
        let b = inv.create_device(b_input).unwrap();
        assert_eq!(b.target_mac.as_deref(), Some("AA:BB:CC:DD:EE:01"));

        inv.delete_device(a.device.id).unwrap();
        let b_after = inv.get_device(b.device.id).unwrap();
        assert_eq!(b_after.device.target_id, None);
    }

    #[test]
    fn test_settings_seeded_and_filtered() {
        let inv = Inventory::new();
        let settings = inv.settings();
        assert_eq!(settings.get("ip_prefix").map(String::as_str), Some("192.168.0"));

        let updated = inv
            .update_settings(BTreeMap::from([
                ("dns_suffix".to_string(), "lan".to_string()),
                ("bogus_key".to_string(), "x".to_string()),
            ]))
            .unwrap();
        assert_eq!(updated.get("dns_suffix").map(String::as_str), Some("lan"));
        assert!(!updated.contains_key("bogus_key"));

        let err = inv
            .update_settings(BTreeMap::from([("nope".to_string(), "x".to_string())]))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
    }

    #[test]
    fn test_hierarchy_counts() {
        let (inv, room, model, firmware, function, _) = seeded();
        for n in 1..=3 {
            let mut input = device_input(room, model, firmware, function);
            input.mac = format!("AA:BB:CC:DD:EE:0{}", n);
            input.ip = None;
            inv.create_device(input).unwrap();
        }
        let tree = inv.hierarchy();
        assert_eq!(tree.total_devices, 3);
        assert_eq!(tree.homes.len(), 1);
        assert_eq!(tree.homes[0].device_count, 3);
        assert_eq!(tree.homes[0].children[0].children[0].device_count, 3);
    }

    #[test]
    fn test_clear_all_resets_counters() {
        let (inv, room, model, firmware, function, _) = seeded();
        inv.create_device(device_input(room, model, firmware, function))
            .unwrap();
        let counts = inv.clear_all();
        assert_eq!(counts.get("devices"), Some(&1));
        assert_eq!(counts.get("homes"), Some(&1));

        // Ids restart from 1 and settings survive.
        let home = inv
            .create_home(HomeInput {
                name: "Again".to_string(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(home.id, 1);
        assert!(inv.settings().contains_key("ip_prefix"));
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let (inv, room, model, firmware, function, _) = seeded();
        inv.create_device(device_input(room, model, firmware, function))
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.json");
        inv.save_to_file(&path).unwrap();

        let restored = Inventory::load_from_file(&path).unwrap();
        assert_eq!(restored.stats(), inv.stats());
        let view = restored.get_device(1).unwrap();
        assert_eq!(view.computed.hostname.as_deref(), Some("l1_kitchen_light_ceiling"));
    }
}
