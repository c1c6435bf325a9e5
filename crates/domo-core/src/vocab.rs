//! Controlled vocabularies for device functions and firmwares
//!
//! Both vocabularies are closed enumerations with a normalization fallback:
//! recognized values map onto the canonical enum, anything else degrades to
//! a best-effort slug so that normalization never fails outright.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::naming::sanitize_slug;

/// Canonical device functions (role / purpose of a device).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CanonicalFunction {
    Button,
    Door,
    Doorbell,
    Heater,
    Light,
    Motion,
    Shutter,
    Tv,
    Window,
    Thermal,
    Ir,
    Presence,
    Energy,
    Infra,
    Water,
    Gaz,
    Sensor,
}

impl CanonicalFunction {
    /// All members, in vocabulary order.
    pub const ALL: [CanonicalFunction; 17] = [
        CanonicalFunction::Button,
        CanonicalFunction::Door,
        CanonicalFunction::Doorbell,
        CanonicalFunction::Heater,
        CanonicalFunction::Light,
        CanonicalFunction::Motion,
        CanonicalFunction::Shutter,
        CanonicalFunction::Tv,
        CanonicalFunction::Window,
        CanonicalFunction::Thermal,
        CanonicalFunction::Ir,
        CanonicalFunction::Presence,
        CanonicalFunction::Energy,
        CanonicalFunction::Infra,
        CanonicalFunction::Water,
        CanonicalFunction::Gaz,
        CanonicalFunction::Sensor,
    ];

    /// The canonical string for this function.
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalFunction::Button => "button",
            CanonicalFunction::Door => "door",
            CanonicalFunction::Doorbell => "doorbell",
            CanonicalFunction::Heater => "heater",
            CanonicalFunction::Light => "light",
            CanonicalFunction::Motion => "motion",
            CanonicalFunction::Shutter => "shutter",
            CanonicalFunction::Tv => "tv",
            CanonicalFunction::Window => "window",
            CanonicalFunction::Thermal => "thermal",
            CanonicalFunction::Ir => "ir",
            CanonicalFunction::Presence => "presence",
            CanonicalFunction::Energy => "energy",
            CanonicalFunction::Infra => "infra",
            CanonicalFunction::Water => "water",
            CanonicalFunction::Gaz => "gaz",
            CanonicalFunction::Sensor => "sensor",
        }
    }

    /// Exact (already lowercased) canonical lookup.
    pub fn from_canonical(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == s)
    }
}

impl fmt::Display for CanonicalFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical device firmwares.
///
/// "embeded" is the canonical spelling in this vocabulary; the normalizer
/// rewrites the textual variant "embedded" onto it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CanonicalFirmware {
    Embeded,
    Tasmota,
    Tuya,
    Zigbee,
    Na,
    Android,
    AndroidCast,
    Wled,
}

impl CanonicalFirmware {
    /// All members, in vocabulary order.
    pub const ALL: [CanonicalFirmware; 8] = [
        CanonicalFirmware::Embeded,
        CanonicalFirmware::Tasmota,
        CanonicalFirmware::Tuya,
        CanonicalFirmware::Zigbee,
        CanonicalFirmware::Na,
        CanonicalFirmware::Android,
        CanonicalFirmware::AndroidCast,
        CanonicalFirmware::Wled,
    ];

    /// The canonical string for this firmware.
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalFirmware::Embeded => "embeded",
            CanonicalFirmware::Tasmota => "tasmota",
            CanonicalFirmware::Tuya => "tuya",
            CanonicalFirmware::Zigbee => "zigbee",
            CanonicalFirmware::Na => "na",
            CanonicalFirmware::Android => "android",
            CanonicalFirmware::AndroidCast => "android-cast",
            CanonicalFirmware::Wled => "wled",
        }
    }

    /// Exact (already lowercased) canonical lookup.
    pub fn from_canonical(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == s)
    }
}

impl fmt::Display for CanonicalFirmware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of normalizing free text against a canonical vocabulary:
/// either a recognized member or a best-effort slug of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized<T> {
    /// The input mapped onto a canonical vocabulary member
    Known(T),
    /// Unrecognized input, slugified but preserved
    Custom(String),
}

impl<T: Copy + Into<&'static str>> Normalized<T> {
    /// The normalized string value.
    pub fn as_str(&self) -> &str {
        match self {
            Normalized::Known(v) => (*v).into(),
            Normalized::Custom(s) => s,
        }
    }
}

impl From<CanonicalFunction> for &'static str {
    fn from(f: CanonicalFunction) -> Self {
        f.as_str()
    }
}

impl From<CanonicalFirmware> for &'static str {
    fn from(f: CanonicalFirmware) -> Self {
        f.as_str()
    }
}

impl<T: Copy + Into<&'static str>> fmt::Display for Normalized<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a free-text function value onto the canonical vocabulary.
///
/// Absent or blank input yields `None` (null and empty string collapse
/// onto the same case). Unrecognized values fall through to the
/// slug sanitizer, so normalization never fails for non-blank input that
/// survives slugification.
pub fn normalize_function(raw: Option<&str>) -> Option<Normalized<CanonicalFunction>> {
    let lowered = raw?.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }
    if let Some(known) = CanonicalFunction::from_canonical(&lowered) {
        return Some(Normalized::Known(known));
    }
    let slug = sanitize_slug(&lowered);
    if slug.is_empty() {
        None
    } else {
        Some(Normalized::Custom(slug))
    }
}

/// Normalize a free-text firmware value onto the canonical vocabulary.
///
/// Same contract as [`normalize_function`], with one extra step: the
/// textual variant "embedded" is rewritten to the canonical "embeded"
/// before the second membership test.
pub fn normalize_firmware(raw: Option<&str>) -> Option<Normalized<CanonicalFirmware>> {
    let lowered = raw?.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }
    if let Some(known) = CanonicalFirmware::from_canonical(&lowered) {
        return Some(Normalized::Known(known));
    }
    let corrected = if lowered == "embedded" {
        "embeded".to_string()
    } else {
        lowered
    };
    if let Some(known) = CanonicalFirmware::from_canonical(&corrected) {
        return Some(Normalized::Known(known));
    }
    let slug = sanitize_slug(&corrected);
    if slug.is_empty() {
        None
    } else {
        Some(Normalized::Custom(slug))
    }
}
