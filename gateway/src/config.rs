//! Gateway connection settings.

use crate::types::Secret;
use std::time::Duration;

/// Default sandbox base URL.
pub const DEFAULT_BASE_URL: &str = "https://pruebas.sypago.net:8086";

/// Settings for [`GatewayClient`](crate::GatewayClient).
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL, without the `/api/v1` prefix
    pub base_url: String,
    /// Client identifier for the token exchange
    pub client_id: String,
    /// API key for the token exchange
    pub api_key: Secret,
    /// Bank code of the merchant account
    pub creditor_bank_code: String,
    /// Merchant account number
    pub creditor_account: String,
    /// Webhook notified on settlement
    pub webhook_url: String,
    /// Statement concept sent with every transaction
    pub concept: String,
    /// Timeout of the token exchange in seconds (default: 15)
    pub auth_timeout_secs: u64,
    /// Timeout of OTP and transaction calls in seconds (default: 30)
    pub mutation_timeout_secs: u64,
    /// Timeout of status queries in seconds (default: 15)
    pub query_timeout_secs: u64,
    /// Timeout of the bank listing in seconds (default: 10)
    pub catalog_timeout_secs: u64,
}

impl GatewayConfig {
    /// Settings with the given credentials and defaults for everything else.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        api_key: Secret,
        creditor_account: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            client_id: client_id.into(),
            api_key,
            creditor_bank_code: "0105".to_string(),
            creditor_account: creditor_account.into(),
            webhook_url: "https://webhook.site/unique-id".to_string(),
            concept: "Concept".to_string(),
            auth_timeout_secs: 15,
            mutation_timeout_secs: 30,
            query_timeout_secs: 15,
            catalog_timeout_secs: 10,
        }
    }

    pub(crate) const fn auth_timeout(&self) -> Duration {
        Duration::from_secs(self.auth_timeout_secs)
    }

    pub(crate) const fn mutation_timeout(&self) -> Duration {
        Duration::from_secs(self.mutation_timeout_secs)
    }

    pub(crate) const fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub(crate) const fn catalog_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog_timeout_secs)
    }
}
