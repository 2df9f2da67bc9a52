//! Server state shared across handlers.

use std::sync::Arc;

use crate::service::PrintService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PrintService>,
    /// Expected `x-print-token`. `None` accepts every request.
    pub token: Option<String>,
}

impl AppState {
    pub fn new(service: Arc<PrintService>, token: Option<String>) -> Self {
        Self {
            service,
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }
}
