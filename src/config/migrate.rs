//! Settings file migration.
//!
//! Each legacy shape gets one pure transform to the next version, so any
//! old file walks forward to [`CURRENT_VERSION`]:
//!
//! ```text
//! v0 (flat, no version) ─► v1 (printers keyed by size) ─► v2 (current)
//! ```
//!
//! v0:
//! ```json
//! {"printerAddress": "00:11:62:AA:BB:CC", "printerName": "Caja", "printerSize": "80mm",
//!  "useBluetooth": true, "fallbackToWeb": false, "autoPrint": true}
//! ```
//!
//! v1:
//! ```json
//! {"version": 1, "printers": {"80mm": {"address": "...", "name": "Caja"}},
//!  "useBluetooth": true, "gatewayUrl": null, "gatewayToken": null, "autoPrint": true}
//! ```

use serde_json::{Map, Value, json};

use crate::error::{Result, TicketeraError};
use crate::printer::SizeClass;

/// Version written by this build.
pub const CURRENT_VERSION: u64 = 2;

/// Bring any known settings shape up to the current version.
pub fn migrate(raw: Value) -> Result<Value> {
    if !raw.is_object() {
        return Err(TicketeraError::InvalidConfig(
            "Settings must be a JSON object".to_string(),
        ));
    }
    match detect_version(&raw) {
        0 => Ok(v1_to_v2(v0_to_v1(raw))),
        1 => Ok(v1_to_v2(raw)),
        CURRENT_VERSION => Ok(raw),
        other => Err(TicketeraError::InvalidConfig(format!(
            "Unsupported settings version {}",
            other
        ))),
    }
}

/// The `version` field, or 0 for the unversioned flat shape.
pub fn detect_version(raw: &Value) -> u64 {
    raw.get("version").and_then(Value::as_u64).unwrap_or(0)
}

/// Flat single-printer preferences to printers keyed by size class.
pub fn v0_to_v1(raw: Value) -> Value {
    let mut printers = Map::new();
    if let Some(address) = str_field(&raw, "printerAddress") {
        let key = str_field(&raw, "printerSize")
            .and_then(SizeClass::parse)
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| "unassigned".to_string());
        let name = str_field(&raw, "printerName").unwrap_or(address);
        printers.insert(key, json!({ "address": address, "name": name }));
    }

    json!({
        "version": 1,
        "printers": printers,
        "useBluetooth": bool_field(&raw, "useBluetooth").unwrap_or(true),
        "gatewayUrl": str_field(&raw, "gatewayUrl"),
        "gatewayToken": Value::Null,
        "autoPrint": bool_field(&raw, "autoPrint").unwrap_or(false),
    })
}

/// Printers keyed by size class to the current nested shape.
///
/// One address listed under several size classes becomes a single printer
/// with no size class, which serves both.
pub fn v1_to_v2(raw: Value) -> Value {
    let mut printers: Vec<Value> = Vec::new();
    if let Some(entries) = raw.get("printers").and_then(Value::as_object) {
        for (key, entry) in entries {
            let Some(address) = str_field(entry, "address") else {
                continue;
            };
            if let Some(existing) = printers
                .iter_mut()
                .find(|p| p["address"].as_str() == Some(address))
            {
                existing["sizeClass"] = Value::Null;
                continue;
            }
            let id = str_field(entry, "id").unwrap_or(address);
            let name = str_field(entry, "name").unwrap_or(address);
            let size_class = SizeClass::parse(key).map(|s| s.as_str());
            printers.push(json!({
                "id": id,
                "address": address,
                "displayName": name,
                "sizeClass": size_class,
            }));
        }
    }

    let mut settings = json!({
        "version": CURRENT_VERSION,
        "printers": printers,
        "policy": {
            "bluetoothEnabled": bool_field(&raw, "useBluetooth").unwrap_or(true),
            "gatewayUrl": str_field(&raw, "gatewayUrl"),
            "gatewayToken": str_field(&raw, "gatewayToken"),
            "autoPrint": bool_field(&raw, "autoPrint").unwrap_or(false),
        },
    });
    // Sections v1 never had are left to their defaults
    for key in ["store", "chunking", "server"] {
        if let Some(section) = raw.get(key) {
            settings[key] = section.clone();
        }
    }
    settings
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn bool_field(value: &Value, key: &str) -> Option<bool> {
    value.get(key).and_then(Value::as_bool)
}
