//! Flat-row import and export
//!
//! Rows carry the same columns the legacy spreadsheet used, minus the
//! computed ones (link, topic, hostname) which are always rederived.
//! Import find-or-creates the hierarchy and catalog entries, normalizing
//! function and firmware values through the canonical vocabularies; export
//! produces rows that re-import cleanly.

use domo_core::{
    normalize_firmware, normalize_function, sanitize_slug, CatalogInput, DeviceInput, HomeInput,
    LevelInput, RoomInput, StoreResult,
};
use serde::{Deserialize, Serialize};

use crate::inventory::{Catalog, Inventory};

/// Hard cap on rows per import request.
const MAX_IMPORT_ROWS: usize = 10_000;

/// One flat device row, the unit of both import and export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRow {
    #[serde(default)]
    pub mac: String,
    /// Legacy state vocabulary: Enable / Enable-Hot / Disable / NA / KO
    #[serde(default)]
    pub state: String,
    /// Bare level number ("0", "1", ...)
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub room_slug: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub position_slug: String,
    #[serde(default)]
    pub function: String,
    #[serde(default)]
    pub firmware: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub interlock: String,
    #[serde(default)]
    pub mode: String,
    /// MAC of the linked target device
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub ha_device_class: String,
    #[serde(default)]
    pub extra: String,
}

/// Per-row import outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowLog {
    pub row: usize,
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
}

/// Summary of a whole import run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub total: usize,
    pub created: usize,
    pub errors: Vec<String>,
    pub logs: Vec<RowLog>,
}

/// Legacy state value -> enabled flag.
fn parse_enabled(state: &str) -> bool {
    let key = state.trim().to_lowercase().replace([' ', '_'], "-");
    matches!(key.as_str(), "enable" | "enable-hot")
}

/// Expand a bare numeric ip using the configured prefix; anything else is
/// stored verbatim (the link resolver stays the security boundary).
fn expand_ip(raw: &str, ip_prefix: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.bytes().all(|b| b.is_ascii_digit()) {
        Some(format!("{}.{}", ip_prefix, raw))
    } else {
        Some(raw.to_string())
    }
}

fn find_or_create_catalog(inv: &Inventory, which: Catalog, name: &str) -> StoreResult<i64> {
    if let Some(existing) = inv.find_catalog_by_name(which, name) {
        return Ok(existing.id);
    }
    let entry = inv.create_catalog(
        which,
        CatalogInput {
            name: name.to_string(),
            enabled: true,
        },
    )?;
    Ok(entry.id)
}

fn import_row(inv: &Inventory, row: &DeviceRow) -> StoreResult<i64> {
    let settings = inv.naming_settings();

    // 1. Implicit home from settings.
    let home_id = match inv.find_home_by_name(&settings.default_home_name) {
        Some(home) => home.id,
        None => {
            inv.create_home(HomeInput {
                name: settings.default_home_name.clone(),
                ..Default::default()
            })?
            .id
        }
    };

    // 2. Level from the bare number.
    let level_raw = {
        let trimmed = row.level.trim();
        if trimmed.is_empty() {
            "0"
        } else {
            trimmed
        }
    };
    let level_slug = format!("l{}", level_raw);
    let level_id = match inv.find_level_by_slug(home_id, &level_slug) {
        Some(level) => level.id,
        None => {
            inv.create_level(LevelInput {
                home_id,
                name: format!("Level {}", level_raw),
                slug: level_slug,
                ..Default::default()
            })?
            .id
        }
    };

    // 3. Room, by slug, falling back to the display name.
    let room_slug = {
        let s = sanitize_slug(&row.room_slug);
        if s.is_empty() {
            sanitize_slug(&row.room)
        } else {
            s
        }
    };
    let room_name = if row.room.trim().is_empty() {
        "Unknown".to_string()
    } else {
        row.room.trim().to_string()
    };
    let room_id = match inv.find_room_by_slug(level_id, &room_slug) {
        Some(room) => room.id,
        None => {
            inv.create_room(RoomInput {
                level_id,
                name: room_name,
                slug: room_slug,
                ..Default::default()
            })?
            .id
        }
    };

    // 4-6. Catalog entries, with vocabulary normalization for firmware
    //      and function. Blank values get the legacy defaults.
    let model_name = {
        let trimmed = row.model.trim();
        if trimmed.is_empty() {
            "Unknown"
        } else {
            trimmed
        }
    };
    let model_id = find_or_create_catalog(inv, Catalog::Model, model_name)?;

    let firmware_name = normalize_firmware(Some(&row.firmware))
        .map(|n| n.as_str().to_string())
        .unwrap_or_else(|| "na".to_string());
    let firmware_id = find_or_create_catalog(inv, Catalog::Firmware, &firmware_name)?;

    let function_name = normalize_function(Some(&row.function))
        .map(|n| n.as_str().to_string())
        .unwrap_or_else(|| "sensor".to_string());
    let function_id = find_or_create_catalog(inv, Catalog::Function, &function_name)?;

    // 7-9. The device itself.
    let view = inv.create_device(DeviceInput {
        mac: row.mac.clone(),
        ip: expand_ip(&row.ip, &settings.ip_prefix),
        enabled: parse_enabled(&row.state),
        position_name: row.position.trim().to_string(),
        position_slug: {
            let s = sanitize_slug(&row.position_slug);
            if s.is_empty() {
                sanitize_slug(&row.position)
            } else {
                s
            }
        },
        mode: Some(row.mode.clone()),
        interlock: Some(row.interlock.clone()),
        ha_device_class: Some(row.ha_device_class.clone()),
        extra: Some(row.extra.clone()),
        room_id,
        model_id,
        firmware_id,
        function_id,
        target_id: None,
    })?;

    Ok(view.device.id)
}

/// Import a batch of flat rows, creating missing hierarchy and catalog
/// entries along the way. Failures are reported per row; the batch never
/// aborts early except at the row cap.
pub fn import_rows(inv: &Inventory, rows: &[DeviceRow]) -> ImportReport {
    let mut report = ImportReport::default();
    // Target links can only be resolved once every row has been created.
    let mut pending_targets: Vec<(i64, String)> = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        let row_no = idx + 1;
        if row_no > MAX_IMPORT_ROWS {
            report
                .errors
                .push(format!("import limited to {} rows", MAX_IMPORT_ROWS));
            break;
        }
        report.total = row_no;

        match import_row(inv, row) {
            Ok(id) => {
                report.created += 1;
                if !row.target.trim().is_empty() {
                    pending_targets.push((id, row.target.trim().to_string()));
                }
                report.logs.push(RowLog {
                    row: row_no,
                    status: "created".to_string(),
                    message: format!("device created (MAC: {})", row.mac),
                    id: Some(id),
                    mac: Some(row.mac.clone()),
                });
            }
            Err(err) => {
                tracing::debug!(row = row_no, %err, "Import row failed");
                report.errors.push(format!("row {}: {}", row_no, err));
                report.logs.push(RowLog {
                    row: row_no,
                    status: "error".to_string(),
                    message: err.to_string(),
                    id: None,
                    mac: None,
                });
            }
        }
    }

    for (device_id, target_mac) in pending_targets {
        match inv.find_device_by_mac(&target_mac) {
            Some(target) => {
                if let Err(err) = inv.set_device_target(device_id, Some(target.id)) {
                    report
                        .errors
                        .push(format!("device {}: {}", device_id, err));
                }
            }
            None => report.errors.push(format!(
                "device {}: target MAC not found: {}",
                device_id, target_mac
            )),
        }
    }

    report
}

/// Export every device as a flat row in the import shape.
pub fn export_rows(inv: &Inventory) -> Vec<DeviceRow> {
    inv.list_devices(None)
        .into_iter()
        .map(|view| {
            let level_slug = view.level_slug.unwrap_or_default();
            // Only numeric slugs carry the synthetic "l" prefix; a named
            // level like "loft" is exported as-is.
            let level = match level_slug.strip_prefix('l') {
                Some(rest) if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) => {
                    rest.to_string()
                }
                _ => level_slug.clone(),
            };
            DeviceRow {
                mac: view.device.mac,
                state: if view.device.enabled {
                    "Enable".to_string()
                } else {
                    "Disable".to_string()
                },
                level,
                room: view.room_name.unwrap_or_default(),
                room_slug: view.room_slug.unwrap_or_default(),
                position: view.device.position_name,
                position_slug: view.device.position_slug,
                function: view.function_name.unwrap_or_default(),
                firmware: view.firmware_name.unwrap_or_default(),
                model: view.model_name.unwrap_or_default(),
                ip: view.device.ip.unwrap_or_default(),
                interlock: view.device.interlock.unwrap_or_default(),
                mode: view.device.mode.unwrap_or_default(),
                target: view.target_mac.unwrap_or_default(),
                ha_device_class: view.device.ha_device_class.unwrap_or_default(),
                extra: view.device.extra.unwrap_or_default(),
            }
        })
        .collect()
}
