//! Shared bearer token cache.
//!
//! One token serves every outbound call. It is refreshed lazily: a caller that
//! finds no token, or one within [`TOKEN_SAFETY_MARGIN_SECS`] of expiry, exchanges
//! credentials for a new one and stores it.
//!
//! Concurrent callers that observe an unusable token each authenticate; the
//! last token written wins. The lock is never held across the token exchange.

use crate::client::endpoint;
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::types::{AuthRequest, Secret, TokenResponse};
use chrono::{DateTime, Duration, Utc};
use raffle_pay_core::environment::Clock;
use reqwest::{Client, StatusCode, header};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A token is only handed out while it has more than this many seconds left to live.
pub const TOKEN_SAFETY_MARGIN_SECS: i64 = 300;

fn safety_margin() -> Duration {
    Duration::seconds(TOKEN_SAFETY_MARGIN_SECS)
}

/// A token as issued by the gateway.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Bearer token
    pub access_token: Secret,
    /// Lifetime in seconds from now
    pub expires_in: i64,
}

/// Source of fresh tokens.
///
/// Production uses [`HttpTokenSource`]; tests substitute a counting double.
pub trait TokenSource: Send + Sync {
    /// Exchange credentials for a new token.
    fn issue(&self) -> Pin<Box<dyn Future<Output = Result<IssuedToken, GatewayError>> + Send + '_>>;
}

#[derive(Clone)]
struct AuthToken {
    value: Secret,
    expires_at: DateTime<Utc>,
}

impl AuthToken {
    fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.value.is_blank() && now < self.expires_at - safety_margin()
    }
}

/// Holds the current bearer token and refreshes it on demand.
pub struct TokenCache {
    source: Arc<dyn TokenSource>,
    clock: Arc<dyn Clock>,
    token: RwLock<Option<AuthToken>>,
}

impl TokenCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new(source: Arc<dyn TokenSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            clock,
            token: RwLock::new(None),
        }
    }

    /// The cached token if still usable, otherwise a freshly issued one.
    ///
    /// # Errors
    ///
    /// Propagates the token source's error. A new token whose lifetime does not
    /// exceed [`TOKEN_SAFETY_MARGIN_SECS`], or whose expiry cannot be
    /// represented, is rejected with [`GatewayError::AuthenticationFailed`]
    /// and not cached.
    pub async fn get_valid_token(&self) -> Result<Secret, GatewayError> {
        {
            let now = self.clock.now();
            let guard = self.token.read().await;
            if let Some(token) = guard.as_ref().filter(|t| t.is_usable(now)) {
                return Ok(token.value.clone());
            }
        }

        tracing::info!("Obtaining new gateway token");
        let issued = self.source.issue().await?;
        metrics::counter!("gateway_token_refresh_total").increment(1);

        if issued.access_token.is_blank() {
            return Err(GatewayError::AuthenticationFailed(
                "gateway issued an empty token".to_string(),
            ));
        }

        if issued.expires_in <= TOKEN_SAFETY_MARGIN_SECS {
            return Err(GatewayError::AuthenticationFailed(format!(
                "token lifetime of {}s does not exceed the {TOKEN_SAFETY_MARGIN_SECS}s safety margin",
                issued.expires_in
            )));
        }

        let expires_at = Duration::try_seconds(issued.expires_in)
            .and_then(|lifetime| self.clock.now().checked_add_signed(lifetime))
            .ok_or_else(|| {
                GatewayError::AuthenticationFailed(format!(
                    "token lifetime of {}s is out of range",
                    issued.expires_in
                ))
            })?;

        let token = AuthToken {
            value: issued.access_token,
            expires_at,
        };
        let value = token.value.clone();
        *self.token.write().await = Some(token);

        tracing::info!(expires_in = issued.expires_in, "New gateway token obtained");
        Ok(value)
    }

    /// Drop the cached token so the next call re-authenticates.
    pub async fn invalidate(&self) {
        *self.token.write().await = None;
        tracing::info!("Gateway token invalidated");
    }

    /// `Bearer <token>` for the `Authorization` header.
    ///
    /// # Errors
    ///
    /// Same as [`TokenCache::get_valid_token`].
    pub async fn authorization_header(&self) -> Result<String, GatewayError> {
        let token = self.get_valid_token().await?;
        Ok(format!("Bearer {}", token.expose()))
    }

    /// Expiry of the cached token, if any.
    pub async fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.token.read().await.as_ref().map(|t| t.expires_at)
    }
}

/// Exchanges client credentials at `POST /api/v1/auth/token`.
pub struct HttpTokenSource {
    client: Client,
    config: Arc<GatewayConfig>,
}

impl HttpTokenSource {
    /// Create a source sharing `client`'s connection pool.
    #[must_use]
    pub const fn new(client: Client, config: Arc<GatewayConfig>) -> Self {
        Self { client, config }
    }

    async fn exchange(&self) -> Result<IssuedToken, GatewayError> {
        const OPERATION: &str = "auth_token";

        let url = endpoint(&self.config.base_url, &["api", "v1", "auth", "token"])?;
        let body = AuthRequest {
            client_id: &self.config.client_id,
            secret: &self.config.api_key,
        };

        let response = self
            .client
            .post(url.clone())
            .header(header::ACCEPT, "application/json")
            .json(&body)
            .timeout(self.config.auth_timeout())
            .send()
            .await
            .map_err(|e| {
                let err = GatewayError::transport(OPERATION, &e);
                tracing::error!(url = %url, error = %err, "Token exchange failed");
                err
            })?;

        let status = response.status();
        tracing::debug!(url = %url, status = status.as_u16(), "Token exchange responded");

        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                url = %url,
                status = status.as_u16(),
                body = %crate::client::truncate(&body),
                "Token exchange rejected"
            );
            return Err(GatewayError::AuthenticationFailed(format!(
                "auth endpoint returned status {}",
                status.as_u16()
            )));
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| {
                tracing::error!(url = %url, error = %e, "Token response could not be parsed");
                GatewayError::ResponseParseFailed(e.to_string())
            })?;

        Ok(IssuedToken {
            access_token: token.access_token,
            expires_in: token.expires_in,
        })
    }
}

impl TokenSource for HttpTokenSource {
    fn issue(&self) -> Pin<Box<dyn Future<Output = Result<IssuedToken, GatewayError>> + Send + '_>> {
        Box::pin(self.exchange())
    }
}
