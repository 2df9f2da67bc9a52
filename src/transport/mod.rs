//! # Printer Transport Layer
//!
//! How rendered documents reach a printer.
//!
//! ## Modules
//!
//! - [`gatt`]: the Bluetooth abstraction the connection manager works against
//! - [`bluetooth`]: RFCOMM backend for Linux
//! - [`connection`]: single-slot session cache with disconnect detection
//! - [`queue`]: FIFO job runner with chunking and one retry
//! - [`selector`]: pure choice between Bluetooth, gateway and host app
//! - [`gateway`]: HTTP client for the print gateway
//! - [`host_app`]: URI hand-off to a companion print app

pub mod bluetooth;
pub mod connection;
pub mod gateway;
pub mod gatt;
pub mod host_app;
pub mod queue;
pub mod selector;

pub use connection::{ConnectionManager, SessionState, WritableChannel};
pub use gateway::GatewayClient;
pub use queue::{ChunkSettings, JobHandle, JobReport, PrintJob, PrintQueue};
pub use selector::{Environment, TransportKind, TransportPolicy, select_transport};
