//! # Printer Configuration
//!
//! Paper size classes and the persisted printer records.
//!
//! ## Size Classes
//!
//! | Class | Paper | Columns (Font A) |
//! |-------|-------|------------------|
//! | 80mm  | 80mm  | 42 |
//! | 58mm  | 58mm  | 32 |
//!
//! Client tickets and cash cuts are laid out for the 80mm class; kitchen
//! orders always use the 32-column layout.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Paper width class of a receipt printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeClass {
    #[serde(rename = "80mm")]
    Mm80,
    #[serde(rename = "58mm")]
    Mm58,
}

impl SizeClass {
    /// Characters per line in the default font.
    pub const fn columns(&self) -> usize {
        match self {
            Self::Mm80 => 42,
            Self::Mm58 => 32,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mm80 => "80mm",
            Self::Mm58 => "58mm",
        }
    }

    /// Parse `"80mm"`/`"80"`/`"58mm"`/`"58"`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "80mm" | "80" => Some(Self::Mm80),
            "58mm" | "58" => Some(Self::Mm58),
            _ => None,
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last known link state of a printer, as shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// A paired receipt printer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterDevice {
    /// Stable identifier (the platform device id).
    pub id: String,
    /// Bluetooth MAC address (`XX:XX:XX:XX:XX:XX`).
    pub address: String,
    pub display_name: String,
    #[serde(default)]
    pub size_class: Option<SizeClass>,
    #[serde(default, skip_serializing)]
    pub connection_status: ConnectionStatus,
}

impl PrinterDevice {
    pub fn new(id: impl Into<String>, address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
            display_name: name.into(),
            size_class: None,
            connection_status: ConnectionStatus::Disconnected,
        }
    }

    pub fn with_size_class(mut self, size_class: SizeClass) -> Self {
        self.size_class = Some(size_class);
        self
    }
}

/// Find the printer that should receive documents of `size_class`.
///
/// An exact size-class match wins; otherwise a printer with no size class
/// assigned is used.
pub fn printer_for(printers: &[PrinterDevice], size_class: SizeClass) -> Option<&PrinterDevice> {
    printers
        .iter()
        .find(|p| p.size_class == Some(size_class))
        .or_else(|| printers.iter().find(|p| p.size_class.is_none()))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns() {
        assert_eq!(SizeClass::Mm80.columns(), 42);
        assert_eq!(SizeClass::Mm58.columns(), 32);
    }

    #[test]
    fn test_parse() {
        assert_eq!(SizeClass::parse("80mm"), Some(SizeClass::Mm80));
        assert_eq!(SizeClass::parse(" 58 "), Some(SizeClass::Mm58));
        assert_eq!(SizeClass::parse("110mm"), None);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&SizeClass::Mm80).unwrap(), "\"80mm\"");
        let parsed: SizeClass = serde_json::from_str("\"58mm\"").unwrap();
        assert_eq!(parsed, SizeClass::Mm58);
    }

    #[test]
    fn test_printer_for_exact_match() {
        let printers = vec![
            PrinterDevice::new("a", "00:11:22:33:44:55", "Caja").with_size_class(SizeClass::Mm80),
            PrinterDevice::new("b", "00:11:22:33:44:66", "Cocina").with_size_class(SizeClass::Mm58),
        ];
        assert_eq!(printer_for(&printers, SizeClass::Mm58).unwrap().id, "b");
        assert_eq!(printer_for(&printers, SizeClass::Mm80).unwrap().id, "a");
    }

    #[test]
    fn test_printer_for_unassigned_fallback() {
        let printers = vec![PrinterDevice::new("a", "00:11:22:33:44:55", "Única")];
        assert_eq!(printer_for(&printers, SizeClass::Mm58).unwrap().id, "a");

        let assigned =
            vec![PrinterDevice::new("a", "00:11:22:33:44:55", "Caja").with_size_class(SizeClass::Mm80)];
        assert!(printer_for(&assigned, SizeClass::Mm58).is_none());
    }
}
