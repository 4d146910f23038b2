//! Error types for the payment gateway client

use raffle_pay_core::TransactionId;
use thiserror::Error;

/// Errors that can occur when talking to the payment gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Caller input failed validation; nothing was sent
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Gateway rejected the bearer token; the cached token has been cleared
    #[error("Gateway returned 401 Unauthorized - token may be expired")]
    Unauthorized,

    /// Gateway has no transaction with this identifier
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// Gateway answered with an unexpected status
    #[error("Gateway error (status {status}): {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// HTTP request failed before a response arrived
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Outbound call exceeded its timeout
    #[error("Gateway call timed out: {0}")]
    Timeout(&'static str),

    /// Response body did not match the expected shape
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// Token exchange failed or produced an unusable token
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),
}

impl GatewayError {
    /// Classify a transport error from `operation`.
    pub(crate) fn transport(operation: &'static str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(operation)
        } else {
            Self::RequestFailed(err.to_string())
        }
    }

    /// Short label used as the `outcome` metric label.
    #[must_use]
    pub const fn outcome(&self) -> &'static str {
        match self {
            Self::Validation(_) => "invalid",
            Self::Unauthorized => "unauthorized",
            Self::TransactionNotFound(_) => "not_found",
            Self::Api { .. } => "api_error",
            Self::RequestFailed(_) => "transport_error",
            Self::Timeout(_) => "timeout",
            Self::ResponseParseFailed(_) => "parse_error",
            Self::AuthenticationFailed(_) => "auth_failed",
        }
    }
}
