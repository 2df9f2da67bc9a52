//! Print routes: one per document kind.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::info;

use super::ApiError;
use crate::model::{CashCutContext, TicketContext};
use crate::server::state::AppState;
use crate::service::PrintOutcome;
use crate::transport::gateway::{PrintRequest, PrintResponse};

type PrintResult = Result<Json<PrintResponse>, ApiError>;

/// Handle POST /api/print/ticket
pub async fn ticket(
    State(state): State<AppState>,
    body: Result<Json<PrintRequest<TicketContext>>, JsonRejection>,
) -> PrintResult {
    let Json(req) = body.map_err(bad_request)?;
    let outcome = state.service.print_ticket(&req.context, &req.options).await?;
    respond("ticket", outcome)
}

/// Handle POST /api/print/kitchen
pub async fn kitchen(
    State(state): State<AppState>,
    body: Result<Json<PrintRequest<TicketContext>>, JsonRejection>,
) -> PrintResult {
    let Json(req) = body.map_err(bad_request)?;
    let outcome = state.service.print_kitchen(&req.context, &req.options).await?;
    respond("kitchen", outcome)
}

/// Handle POST /api/print/cash-cut
pub async fn cash_cut(
    State(state): State<AppState>,
    body: Result<Json<PrintRequest<CashCutContext>>, JsonRejection>,
) -> PrintResult {
    let Json(req) = body.map_err(bad_request)?;
    let outcome = state.service.print_cash_cut(&req.context, &req.options).await?;
    respond("cash-cut", outcome)
}

fn bad_request(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}

fn respond(kind: &str, outcome: PrintOutcome) -> PrintResult {
    match outcome {
        PrintOutcome::Declined => Err(ApiError::Declined),
        outcome => {
            info!(kind, outcome = ?outcome, "Printed via gateway");
            Ok(Json(PrintResponse {
                success: true,
                error: None,
            }))
        }
    }
}
