//! Liveness and printer status.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::printer::{ConnectionStatus, SizeClass};
use crate::server::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterStatus {
    pub id: String,
    pub display_name: String,
    pub size_class: Option<SizeClass>,
    pub connection_status: ConnectionStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub bluetooth_available: bool,
    pub printers: Vec<PrinterStatus>,
}

/// Handle GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let printers = state
        .service
        .printers()
        .into_iter()
        .map(|p| PrinterStatus {
            id: p.id,
            display_name: p.display_name,
            size_class: p.size_class,
            connection_status: p.connection_status,
        })
        .collect();

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        bluetooth_available: state.service.connections().is_available(),
        printers,
    })
}
