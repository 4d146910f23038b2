//! HTTP surface for Raffle Pay.
//!
//! Axum handlers over the reservation engine and the payment gateway client.
//! Handlers stay thin: they extract the request, call into
//! `raffle-pay-core` or `raffle-pay-gateway`, and map the result to a
//! response. Domain errors become [`AppError`]s.
//!
//! # Request Flow
//!
//! 1. **Reserve** tickets: `POST /api/v1/raffles/participant` returns a booking id
//! 2. **Request OTP**: `POST /api/v1/sypago/debit/request-otp`
//! 3. **Confirm** with the OTP: `POST /api/v1/sypago/debit/transaction-otp`
//! 4. **Poll** until settled: `GET /api/v1/sypago/debit/transaction/status`
//!
//! # Example
//!
//! ```ignore
//! use raffle_pay_web::{AppState, build_router};
//!
//! let state = AppState::new(gateway, reservations, catalog);
//! let app = build_router(state, &config.server.cors_allowed_origins);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use middleware::{SECURITY_HEADERS, cors_layer, security_headers_layer};
pub use routes::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
