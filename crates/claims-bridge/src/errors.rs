use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Faults raised by the bridge.
///
/// Routine outcomes (a stale token, an unknown account) are NOT errors; they
/// travel as `ValidationOutcome` / `Resolution` values. Only `Unauthenticated`
/// is produced from them, and only at the HTTP boundary.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// The token decoded but the session could not be bound to an account.
    ///
    /// The reason is for logs only; it is never echoed to the client because it
    /// reveals whether an account exists.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            BridgeError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "An internal database error occurred".to_string(),
            ),
            BridgeError::Crypto(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CRYPTO_ERROR",
                "An internal cryptographic error occurred".to_string(),
            ),
            BridgeError::InvalidToken(reason) => {
                (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", reason.clone())
            }
            BridgeError::Unauthenticated(_) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "The access token is invalid or expired".to_string(),
            ),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(error_response)).into_response()
    }
}
