//! # Raffle Pay Gateway
//!
//! Client for the debit-OTP payment gateway that settles raffle ticket
//! purchases.
//!
//! A purchase takes three calls against the gateway:
//!
//! 1. [`GatewayClient::request_otp`]: the payer's bank sends them a one-time password
//! 2. [`GatewayClient::confirm_transaction`]: the OTP authorizes the debit
//! 3. [`GatewayClient::poll_status`]: repeated until the transaction settles
//!
//! Every call carries a bearer token from the shared [`TokenCache`].
//!
//! ## Example
//!
//! ```no_run
//! use raffle_pay_core::environment::SystemClock;
//! use raffle_pay_core::{BookingRegistry, MockRaffleCatalog, TransactionId};
//! use raffle_pay_gateway::{GatewayClient, GatewayConfig, Secret};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let clock = Arc::new(SystemClock);
//!     let config = GatewayConfig::new(
//!         "https://pruebas.sypago.net:8086",
//!         "client-id",
//!         Secret::new("api-key"),
//!         "01050000000000000000",
//!     );
//!     let client = GatewayClient::new(
//!         config,
//!         clock.clone(),
//!         Arc::new(BookingRegistry::new()),
//!         Arc::new(MockRaffleCatalog::new(clock)),
//!     );
//!
//!     let report = client
//!         .poll_status(&TransactionId::from("TX-1"), None, None)
//!         .await?;
//!     println!("{} {}", report.status, report.rsn);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod token;
pub mod types;
pub mod validation;

// Re-export main types for convenience
pub use client::GatewayClient;
pub use config::GatewayConfig;
pub use error::GatewayError;
pub use token::{HttpTokenSource, IssuedToken, TokenCache, TokenSource};
pub use types::{
    BankSummary, DebitRequest, OtpAck, Secret, StatusReport, TransactionConfirmation,
    TransactionRequest,
};
