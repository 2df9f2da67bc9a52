//! Shared-secret check for the print routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::handlers::ApiError;
use super::state::AppState;
use crate::transport::gateway::TOKEN_HEADER;

/// Reject requests whose `x-print-token` does not match the configured one.
pub async fn require_token(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.token.as_deref() else {
        return Ok(next.run(req).await);
    };

    let provided = req
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|h| h.to_str().ok());

    if provided != Some(expected) {
        warn!(uri = %req.uri(), present = provided.is_some(), "Rejected print request: bad token");
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(req).await)
}
