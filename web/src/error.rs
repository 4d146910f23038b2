//! Error types for web handlers.
//!
//! [`AppError`] bridges reservation and gateway errors to HTTP responses with a
//! `{code, message}` JSON body.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use raffle_pay_core::ReservationError;
use raffle_pay_gateway::GatewayError;
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler(Path(id): Path<String>) -> Result<Json<Raffle>, AppError> {
///     let raffle = catalog
///         .raffle(&RaffleId::from(id.as_str()))
///         .ok_or_else(|| AppError::not_found(format!("No raffle found with ID: {id}")))?;
///     Ok(Json(raffle))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            message.into(),
            "BAD_REQUEST".to_string(),
        )
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            message.into(),
            "NOT_FOUND".to_string(),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }

    /// Create a 502 Bad Gateway error.
    #[must_use]
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_GATEWAY,
            message.into(),
            "BAD_GATEWAY".to_string(),
        )
    }

    /// Create a 504 Gateway Timeout error.
    #[must_use]
    pub fn gateway_timeout(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::GATEWAY_TIMEOUT,
            message.into(),
            "GATEWAY_TIMEOUT".to_string(),
        )
    }

    /// HTTP status of this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// User-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Request failed"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Request failed"
                );
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        match err {
            ReservationError::RaffleNotFound(_) => Self::not_found(err.to_string()),
            ReservationError::MissingFields(_) => Self::bad_request(err.to_string()),
            ReservationError::InvalidTicketRange { .. } => Self::new(
                StatusCode::BAD_REQUEST,
                err.to_string(),
                "INVALID_TICKET_RANGE".to_string(),
            ),
        }
    }
}

/// Gateway failures are the upstream's fault, so they surface as 502/504.
/// Only caller mistakes keep a 4xx status.
impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Validation(message) => Self::bad_request(message),
            GatewayError::TransactionNotFound(id) => {
                Self::not_found(format!("Transaction not found: {id}"))
            }
            GatewayError::Unauthorized => Self::new(
                StatusCode::BAD_GATEWAY,
                "Payment gateway rejected our credentials".to_string(),
                "GATEWAY_UNAUTHORIZED".to_string(),
            ),
            GatewayError::Timeout(_) => Self::gateway_timeout("Payment gateway timed out")
                .with_source(anyhow::Error::new(err)),
            other => Self::bad_gateway("Payment gateway request failed")
                .with_source(anyhow::Error::new(other)),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Invalid request format: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(format!("Invalid query: {}", rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raffle_pay_core::{RaffleId, TransactionId};

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn test_reservation_errors() {
        let missing = AppError::from(ReservationError::RaffleNotFound(RaffleId::from("raffle-9")));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing.message(), "No raffle found with ID: raffle-9");

        let range = AppError::from(ReservationError::InvalidTicketRange {
            ticket: 1000,
            raffle_id: RaffleId::from("raffle-002"),
            first: 1001,
            last: 1800,
        });
        assert_eq!(range.status(), StatusCode::BAD_REQUEST);
        assert_eq!(range.code(), "INVALID_TICKET_RANGE");
    }

    #[test]
    fn test_gateway_error_mapping() {
        let cases = [
            (GatewayError::Validation("amount must be greater than 0".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (GatewayError::TransactionNotFound(TransactionId::from("TX-1")), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (GatewayError::Unauthorized, StatusCode::BAD_GATEWAY, "GATEWAY_UNAUTHORIZED"),
            (GatewayError::Timeout("poll_status"), StatusCode::GATEWAY_TIMEOUT, "GATEWAY_TIMEOUT"),
            (GatewayError::Api { status: 500, body: "boom".into() }, StatusCode::BAD_GATEWAY, "BAD_GATEWAY"),
            (GatewayError::AuthenticationFailed("nope".into()), StatusCode::BAD_GATEWAY, "BAD_GATEWAY"),
        ];

        for (err, status, code) in cases {
            let app = AppError::from(err);
            assert_eq!(app.status(), status);
            assert_eq!(app.code(), code);
        }
    }

    #[test]
    fn test_upstream_body_not_exposed() {
        let err = AppError::from(GatewayError::Api {
            status: 500,
            body: "stack trace".into(),
        });
        assert!(!err.message().contains("stack trace"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
