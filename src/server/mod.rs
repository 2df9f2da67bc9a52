//! # Print Gateway Server
//!
//! Lets devices without Bluetooth print through a machine that has it.
//! Each route renders the posted context and sends it straight to a
//! Bluetooth printer:
//!
//! | Route | Body |
//! |-------|------|
//! | `GET /api/health` | |
//! | `POST /api/print/ticket` | `TicketContext` + `options` |
//! | `POST /api/print/kitchen` | `TicketContext` + `options` |
//! | `POST /api/print/cash-cut` | `CashCutContext` + `options` |
//!
//! ## Usage
//!
//! ```bash
//! ticketera serve --config ticketera.json
//! ```

mod auth;
pub mod handlers;
mod state;

pub use state::AppState;

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Settings;
use crate::error::{Result, TicketeraError};
use crate::service::PrintService;
use crate::transport::gatt::BluetoothBackend;
use crate::transport::{ConnectionManager, Environment, PrintQueue, TransportPolicy};

/// Build the gateway router.
pub fn router(state: AppState) -> Router {
    let print = Router::new()
        .route("/api/print/ticket", post(handlers::print::ticket))
        .route("/api/print/kitchen", post(handlers::print::kitchen))
        .route("/api/print/cash-cut", post(handlers::print::cash_cut))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_token,
        ));

    Router::new()
        .route("/api/health", get(handlers::health::health))
        .merge(print)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Print service for the gateway: Bluetooth only, never forwarding to
/// another gateway or a host app.
pub fn gateway_service(settings: &Settings, backend: Arc<dyn BluetoothBackend>) -> Result<PrintService> {
    let connections = Arc::new(ConnectionManager::new(backend));
    let env = Environment::default().with_bluetooth(connections.is_available());
    let queue = PrintQueue::spawn(connections, settings.chunking);
    let service = PrintService::new(
        settings.store.clone(),
        TransportPolicy::bluetooth_only(),
        settings.printers.clone(),
        queue,
    )?;
    Ok(service.with_environment(env))
}

/// Run the gateway until Ctrl-C.
pub async fn serve(settings: &Settings, backend: Arc<dyn BluetoothBackend>) -> Result<()> {
    let addr = settings.listen_addr()?;
    let service = Arc::new(gateway_service(settings, backend)?);
    let state = AppState::new(service, settings.server.token.clone());

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        TicketeraError::Capability(format!("Failed to bind to {}: {}", addr, e))
    })?;

    info!(
        listen = %addr,
        printers = settings.printers.len(),
        token = state.token.is_some(),
        "Print gateway listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Print gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until killed
        std::future::pending::<()>().await;
    }
}
