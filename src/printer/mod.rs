//! # Printer Module
//!
//! Printer records and paper size classes.
//!
//! ## Modules
//!
//! - [`config`]: size classes, printer records and size-class lookup

pub mod config;

pub use config::{ConnectionStatus, PrinterDevice, SizeClass, printer_for};
