//! HTTP handlers for the print gateway.

pub mod health;
pub mod print;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::TicketeraError;
use crate::transport::gateway::PrintResponse;

/// Error answer of a gateway route, always a [`PrintResponse`] body.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    BadRequest(String),
    Declined,
    Print(TicketeraError),
}

impl From<TicketeraError> for ApiError {
    fn from(e: TicketeraError) -> Self {
        Self::Print(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Invalid print token".to_string()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Declined => (StatusCode::CONFLICT, "Printing was declined".to_string()),
            Self::Print(e) => (status_for(&e), e.to_string()),
        };
        let body = PrintResponse {
            success: false,
            error: Some(message),
        };
        (status, Json(body)).into_response()
    }
}

/// HTTP status for a failed print.
pub fn status_for(error: &TicketeraError) -> StatusCode {
    match error {
        TicketeraError::Capability(_) => StatusCode::SERVICE_UNAVAILABLE,
        TicketeraError::Connection(_)
        | TicketeraError::Protocol(_)
        | TicketeraError::Transmission(_)
        | TicketeraError::Gateway { .. } => StatusCode::BAD_GATEWAY,
        TicketeraError::UserCancelled => StatusCode::CONFLICT,
        TicketeraError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        TicketeraError::InvalidConfig(_) | TicketeraError::Json(_) => StatusCode::BAD_REQUEST,
        TicketeraError::Io(_) | TicketeraError::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
