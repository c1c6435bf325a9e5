//! Device record, input payload, and the joined read model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::naming::{compute_derived_fields, DerivedFields, DeviceContext, NamingSettings};

/// A physical device. The most complex record: foreign keys to room, model,
/// firmware, function, and an optional self-reference for linked devices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: i64,
    /// Unique identifier of the physical unit
    pub mac: String,
    /// Bare last octet or full dotted quad; unique when set
    pub ip: Option<String>,
    pub enabled: bool,
    #[serde(default)]
    pub position_name: String,
    #[serde(default)]
    pub position_slug: String,
    pub mode: Option<String>,
    pub interlock: Option<String>,
    pub ha_device_class: Option<String>,
    /// Opaque JSON-ish payload carried through untouched
    pub extra: Option<String>,
    pub room_id: i64,
    pub model_id: i64,
    pub firmware_id: i64,
    pub function_id: i64,
    /// Optional linked device (e.g. a shutter's paired button)
    pub target_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating or updating a device.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInput {
    pub mac: String,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub position_name: String,
    #[serde(default)]
    pub position_slug: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub interlock: Option<String>,
    #[serde(default)]
    pub ha_device_class: Option<String>,
    #[serde(default)]
    pub extra: Option<String>,
    pub room_id: i64,
    pub model_id: i64,
    pub firmware_id: i64,
    pub function_id: i64,
    #[serde(default)]
    pub target_id: Option<i64>,
}

fn default_enabled() -> bool {
    true
}

/// A device joined with its hierarchy and catalog names, plus the computed
/// fields. This is what every device read endpoint returns; it is rebuilt
/// on each request and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceView {
    #[serde(flatten)]
    pub device: Device,
    pub room_name: Option<String>,
    pub room_slug: Option<String>,
    pub level_name: Option<String>,
    pub level_slug: Option<String>,
    pub home_name: Option<String>,
    pub model_name: Option<String>,
    pub firmware_name: Option<String>,
    pub function_name: Option<String>,
    /// MAC of the linked target device, when any
    pub target_mac: Option<String>,
    #[serde(flatten)]
    pub computed: DerivedFields,
}

impl DeviceView {
    /// Join a device with its related names and compute the derived fields.
    #[allow(clippy::too_many_arguments)]
    pub fn assemble(
        device: Device,
        room: Option<(&str, &str)>,
        level: Option<(&str, &str)>,
        home_name: Option<&str>,
        model_name: Option<&str>,
        firmware_name: Option<&str>,
        function_name: Option<&str>,
        target_mac: Option<&str>,
        settings: &NamingSettings,
    ) -> Self {
        let ctx = DeviceContext {
            level_slug: level.map(|(_, slug)| slug).unwrap_or(""),
            room_slug: room.map(|(_, slug)| slug).unwrap_or(""),
            function_name: function_name.unwrap_or(""),
            position_slug: &device.position_slug,
            ip: device.ip.as_deref(),
        };
        let computed = compute_derived_fields(&ctx, settings);

        Self {
            room_name: room.map(|(name, _)| name.to_string()),
            room_slug: room.map(|(_, slug)| slug.to_string()),
            level_name: level.map(|(name, _)| name.to_string()),
            level_slug: level.map(|(_, slug)| slug.to_string()),
            home_name: home_name.map(str::to_string),
            model_name: model_name.map(str::to_string),
            firmware_name: firmware_name.map(str::to_string),
            function_name: function_name.map(str::to_string),
            target_mac: target_mac.map(str::to_string),
            computed,
            device,
        }
    }
}
