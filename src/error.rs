//! # Error Types
//!
//! This module defines the error type used throughout the ticketera library.
//!
//! ## Taxonomy
//!
//! | Variant | Raised by | Retried by the job runner |
//! |---------|-----------|---------------------------|
//! | `Capability` | missing Bluetooth support, no transport available | no |
//! | `Connection` | GATT connect / device lookup | once |
//! | `Protocol` | service or characteristic discovery | once |
//! | `Transmission` | a rejected chunk write | once, after reconnect |
//! | `UserCancelled` | device chooser dismissed | no (not an error for the caller) |
//! | `Timeout` | gateway HTTP deadline | no |
//! | `Gateway` | gateway answered with a non-2xx status | no |
//!
//! Formatters and the code-page encoder never return errors.

use thiserror::Error;

/// Main error type for ticketera operations
#[derive(Debug, Error)]
pub enum TicketeraError {
    /// A required transport is absent (no Bluetooth, no gateway URL)
    #[error("Capability error: {0}")]
    Capability(String),

    /// Device lookup or GATT connect failed
    #[error("Connection error: {0}")]
    Connection(String),

    /// Expected service or writable characteristic not found
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A chunk write was rejected by the device
    #[error("Transmission error: {0}")]
    Transmission(String),

    /// The user dismissed the device chooser
    #[error("Device selection cancelled")]
    UserCancelled,

    /// Gateway request exceeded its deadline
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Gateway rejected the request
    #[error("Gateway returned {status}: {message}")]
    Gateway { status: u16, message: String },

    /// Invalid configuration or settings file
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl TicketeraError {
    /// Whether the job runner should drop the session and try once more.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Protocol(_) | Self::Transmission(_)
        )
    }

    /// Whether this is the user declining to pick a device.
    pub fn is_user_cancelled(&self) -> bool {
        matches!(self, Self::UserCancelled)
    }
}

/// Result alias used across the crate.
pub type Result<T, E = TicketeraError> = std::result::Result<T, E>;
