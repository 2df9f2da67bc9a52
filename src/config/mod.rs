//! # Settings
//!
//! Everything the printing core needs from the outside, persisted as one
//! JSON file (default `ticketera.json`):
//!
//! ```json
//! {
//!   "version": 2,
//!   "store": {"name": "La Baguetería", "thankYou": ["¡Gracias!"]},
//!   "printers": [{"id": "caja", "address": "00:11:62:AA:BB:CC",
//!                 "displayName": "Caja", "sizeClass": "80mm"}],
//!   "policy": {"bluetoothEnabled": true, "gatewayUrl": null, "autoPrint": true},
//!   "chunking": {"chunkSize": 512, "chunkDelayMs": 50},
//!   "server": {"listenAddr": "0.0.0.0:3001", "token": null}
//! }
//! ```
//!
//! Older files are upgraded by [`migrate`] on load; every section is
//! optional and falls back to its defaults.

pub mod migrate;

use std::collections::HashSet;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, TicketeraError};
use crate::printer::PrinterDevice;
use crate::receipt::StoreInfo;
use crate::transport::bluetooth::is_valid_mac;
use crate::transport::queue::MAX_CHUNK_SIZE;
use crate::transport::{ChunkSettings, TransportPolicy};

/// Settings file used when `--config` is not given.
pub const DEFAULT_PATH: &str = "ticketera.json";

/// Print gateway server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    pub listen_addr: String,
    /// Shared secret expected in `x-print-token`. `None` disables the check.
    pub token: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3001".to_string(),
            token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub version: u64,
    pub store: StoreInfo,
    pub printers: Vec<PrinterDevice>,
    pub policy: TransportPolicy,
    pub chunking: ChunkSettings,
    pub server: ServerSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: migrate::CURRENT_VERSION,
            store: StoreInfo::default(),
            printers: Vec::new(),
            policy: TransportPolicy::default(),
            chunking: ChunkSettings::default(),
            server: ServerSettings::default(),
        }
    }
}

impl Settings {
    /// Load from `path`, migrating older shapes. A missing file gives the
    /// defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let settings = Self::from_json(&content)?;
        info!(path = %path.display(), printers = settings.printers.len(), "Settings loaded");
        Ok(settings)
    }

    /// Parse, migrate and validate a settings document.
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_str(content)?;
        let from = migrate::detect_version(&raw);
        let current = migrate::migrate(raw)?;
        if from != migrate::CURRENT_VERSION {
            info!(from, to = migrate::CURRENT_VERSION, "Migrated settings");
        }
        let settings: Self = serde_json::from_value(current)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Write the settings as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for printer in &self.printers {
            if !is_valid_mac(&printer.address) {
                return Err(TicketeraError::InvalidConfig(format!(
                    "Printer '{}' has an invalid Bluetooth address: {}",
                    printer.id, printer.address
                )));
            }
            if !ids.insert(printer.id.as_str()) {
                return Err(TicketeraError::InvalidConfig(format!(
                    "Duplicate printer id '{}'",
                    printer.id
                )));
            }
        }
        if self.chunking.chunk_size == 0 || self.chunking.chunk_size > MAX_CHUNK_SIZE {
            return Err(TicketeraError::InvalidConfig(format!(
                "chunkSize must be between 1 and {}",
                MAX_CHUNK_SIZE
            )));
        }
        self.listen_addr()?;
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.server.listen_addr.parse().map_err(|_| {
            TicketeraError::InvalidConfig(format!(
                "Invalid listen address: {}",
                self.server.listen_addr
            ))
        })
    }
}
