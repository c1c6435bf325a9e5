//! Slug sanitizer and derived-field engine
//!
//! Pure, deterministic transforms that turn a device's hierarchical context
//! (level / room / function / position) plus naming settings into hostname,
//! MQTT topic, FQDN, and HTTP link. Every function degrades to `None` on
//! missing or unacceptable input; nothing here panics or guesses.

use serde::{Deserialize, Serialize};

/// Naming parameters consumed by the derived-field engine.
///
/// Passed explicitly into every computation - there is no ambient settings
/// cache to warm. The defaults mirror the seeded application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingSettings {
    /// Three-octet prefix used to expand bare last-octet IPs (e.g. "192.168.0")
    pub ip_prefix: String,
    /// Domain suffix appended to hostnames to form the FQDN
    pub dns_suffix: String,
    /// First segment of every MQTT topic
    pub mqtt_topic_prefix: String,
    /// Name used for the implicit home during imports
    pub default_home_name: String,
}

impl Default for NamingSettings {
    fn default() -> Self {
        Self {
            ip_prefix: "192.168.0".to_string(),
            dns_suffix: "local".to_string(),
            mqtt_topic_prefix: "home".to_string(),
            default_home_name: "Home".to_string(),
        }
    }
}

/// Hierarchical context of a device, as joined from its room/level/function.
#[derive(Debug, Clone, Default)]
pub struct DeviceContext<'a> {
    /// Level slug ("1", "l2", ...); empty means ground level
    pub level_slug: &'a str,
    /// Room slug
    pub room_slug: &'a str,
    /// Function name (free text, slugified here)
    pub function_name: &'a str,
    /// Position slug within the room
    pub position_slug: &'a str,
    /// Raw stored IP value (bare octet or dotted quad)
    pub ip: Option<&'a str>,
}

/// Computed per-device fields. Transient: recomputed on every read,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedFields {
    /// HTTP link to the device, or `None` when the IP is absent or rejected
    pub link: Option<String>,
    /// Full MQTT topic; `None` unless room, function and position all resolve
    pub mqtt_topic: Option<String>,
    /// Underscore-joined hostname from the non-empty hierarchy segments
    pub hostname: Option<String>,
    /// Hostname plus the configured DNS suffix
    pub fqdn: Option<String>,
    /// Character length of the hostname. The wire name is a historical
    /// misnomer kept for compatibility with existing exports.
    #[serde(rename = "countTopic")]
    pub hostname_len: Option<usize>,
}

/// Convert free text into a slug: trim, lowercase, whitespace runs become a
/// single hyphen, and anything outside `[a-z0-9\-_.]` is stripped.
///
/// Always returns a string (possibly empty); callers treat the empty string
/// as "no value". Idempotent, no length limit, no uniqueness guarantee.
pub fn sanitize_slug(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;
    for ch in lowered.chars() {
        if ch.is_whitespace() {
            pending_hyphen = true;
            continue;
        }
        if pending_hyphen {
            slug.push('-');
            pending_hyphen = false;
        }
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '-' | '_' | '.') {
            slug.push(ch);
        }
    }
    slug
}

/// True when `s` is one to three ASCII digits.
fn is_octet_group(s: &str) -> bool {
    !s.is_empty() && s.len() <= 3 && s.bytes().all(|b| b.is_ascii_digit())
}

/// True when `s` has exactly `n` dot-separated octet groups.
fn has_octet_groups(s: &str, n: usize) -> bool {
    let groups: Vec<&str> = s.split('.').collect();
    groups.len() == n && groups.iter().all(|g| is_octet_group(g))
}

/// Resolve a stored IP value into an `http://` URL.
///
/// This is the one security boundary in the engine: the result is rendered
/// as an anchor `href`, so only two shapes are accepted:
///
/// * an all-digit value in `[0, 255]`, expanded to `http://{ip_prefix}.{n}/`
///   - and only when `ip_prefix` itself is a three-octet group, otherwise
///   the expansion fails closed;
/// * a full dotted quad, used verbatim as `http://{ip}/`.
///
/// Anything else (scheme-carrying URLs, `javascript:` URIs, partial garbage)
/// resolves to `None` and is never passed through.
pub fn build_http_from_ip(ip: &str, ip_prefix: &str) -> Option<String> {
    let ip = ip.trim();
    if ip.is_empty() {
        return None;
    }

    if ip.bytes().all(|b| b.is_ascii_digit()) {
        let octet: u32 = ip.parse().ok()?;
        if octet > 255 {
            return None;
        }
        if !has_octet_groups(ip_prefix, 3) {
            return None;
        }
        return Some(format!("http://{}.{}/", ip_prefix, octet));
    }

    if has_octet_groups(ip, 4) {
        return Some(format!("http://{}/", ip));
    }

    None
}

/// Normalize the level segment: sanitized slug, `"l0"` when absent, and a
/// bare number gets the `l` prefix ("1" -> "l1").
fn level_segment(raw: &str) -> String {
    let slug = sanitize_slug(raw);
    if slug.is_empty() {
        "l0".to_string()
    } else if slug.bytes().all(|b| b.is_ascii_digit()) {
        format!("l{}", slug)
    } else {
        slug
    }
}

/// Compute all derived fields for a device from its hierarchical context.
///
/// Each field is independently nullable; a partial hierarchy still produces
/// a usable hostname while the MQTT topic requires room, function, and
/// position to all be present (a topic with holes is not a valid topic).
pub fn compute_derived_fields(ctx: &DeviceContext<'_>, settings: &NamingSettings) -> DerivedFields {
    let level = level_segment(ctx.level_slug);
    let room = sanitize_slug(ctx.room_slug);
    let function = sanitize_slug(ctx.function_name);
    let position = sanitize_slug(ctx.position_slug);

    let segments: Vec<&str> = [level.as_str(), room.as_str(), function.as_str(), position.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();

    let hostname = if segments.is_empty() {
        None
    } else {
        Some(segments.join("_"))
    };

    let mqtt_topic = if room.is_empty() || function.is_empty() || position.is_empty() {
        None
    } else {
        Some(format!(
            "{}/{}/{}/{}/{}",
            settings.mqtt_topic_prefix, level, room, function, position
        ))
    };

    let fqdn = hostname
        .as_ref()
        .map(|h| format!("{}.{}", h, settings.dns_suffix));

    let link = ctx
        .ip
        .and_then(|ip| build_http_from_ip(ip, &settings.ip_prefix));

    let hostname_len = hostname.as_ref().map(|h| h.chars().count());

    DerivedFields {
        link,
        mqtt_topic,
        hostname,
        fqdn,
        hostname_len,
    }
}
