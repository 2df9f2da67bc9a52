//! # Ticketera - Restaurant Receipt Printing
//!
//! Ticketera is the printing core of a restaurant point-of-sale. It turns
//! orders and cash-register cuts into ESC/POS bytes and delivers them to
//! thermal printers over Bluetooth, through a print gateway, or by handing
//! them to a companion app. It provides:
//!
//! - **Encoding**: Spanish text folded to code page PC850
//! - **Formatters**: client ticket, kitchen order and cash-cut report
//! - **Transport**: cached Bluetooth sessions, a FIFO print queue, gateway client
//! - **Gateway server**: the HTTP process other devices print through
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use ticketera::{
//!     model::{CartLine, TicketContext},
//!     printer::{PrinterDevice, SizeClass},
//!     receipt::{PrintOptions, StoreInfo},
//!     service::PrintService,
//!     transport::{ChunkSettings, ConnectionManager, PrintQueue, TransportPolicy, bluetooth::RfcommBackend},
//! };
//!
//! # async fn example() -> ticketera::Result<()> {
//! let connections = Arc::new(ConnectionManager::new(Arc::new(RfcommBackend::new())));
//! let queue = PrintQueue::spawn(connections, ChunkSettings::default());
//! let printer = PrinterDevice::new("caja", "00:11:62:AA:BB:CC", "Caja").with_size_class(SizeClass::Mm80);
//! let service = PrintService::new(StoreInfo::default(), TransportPolicy::default(), vec![printer], queue)?;
//!
//! let ctx = TicketContext {
//!     order_number: Some("42".into()),
//!     customer_name: Some("Ana".into()),
//!     date_str: "19/10/2026 13:05".into(),
//!     payment_method_label: "Efectivo".into(),
//!     total: 85.0,
//!     lines: vec![CartLine::new("Baguette Pavo", 1, 85.0)],
//! };
//! service.print_ticket(&ctx, &PrintOptions::default()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | ESC/POS command builders and the code-page encoder |
//! | [`ir`] | Intermediate representation compiled to bytes, HTML or host app entries |
//! | [`components`] | Builders for receipt layouts |
//! | [`receipt`] | The three document formatters |
//! | [`transport`] | Bluetooth sessions, print queue, transport selection |
//! | [`service`] | The print entry point for application code |
//! | [`server`] | Print gateway HTTP server |
//! | [`config`] | Settings file and its migrations |
//! | [`error`] | Error types |

pub mod components;
pub mod config;
pub mod error;
pub mod ir;
pub mod model;
pub mod printer;
pub mod protocol;
pub mod receipt;
pub mod server;
pub mod service;
pub mod transport;

// Re-exports for convenience
pub use error::{Result, TicketeraError};
pub use printer::{PrinterDevice, SizeClass};
pub use service::{PrintOutcome, PrintService};
