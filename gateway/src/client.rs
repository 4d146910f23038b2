//! Debit-OTP gateway client.
//!
//! Every operation has the same shape: validate the caller's flat record, build
//! the gateway's nested payload, attach `Authorization` from the [`TokenCache`],
//! issue one timed HTTP call and classify the response.
//!
//! ```text
//! request_otp          POST /api/v1/request/otp          200 only
//! confirm_transaction  POST /api/v1/transaction/otp      any 2xx
//! poll_status          GET  /api/v1/transaction/{id}     200, 404 → not found
//! list_banks           GET  /api/v1/banks                200
//! ```
//!
//! A 401 from any call clears the cached token and fails the call. Nothing is
//! retried automatically; `confirm_transaction` in particular must never be,
//! since the gateway attributes a debit to each call.

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::token::{HttpTokenSource, TokenCache};
use crate::types::{
    Account, Amount, AmountWithRate, Bank, BankSummary, CREDITOR_ACCOUNT_TYPE,
    DEBITOR_ACCOUNT_TYPE, DebitRequest, DocumentInfo, NotificationUrls, OtpAck,
    OtpRequestPayload, ReceivingUser, Secret, StatusReport, TransactionConfirmation,
    TransactionCreated, TransactionPayload, TransactionRequest, TransactionStatus,
};
use raffle_pay_core::environment::Clock;
use raffle_pay_core::{BookingId, BookingRegistry, RaffleCatalog, StatusTranslator, TransactionId};
use reqwest::{Client, RequestBuilder, StatusCode, Url, header};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Longest response body excerpt written to the log.
pub(crate) const LOG_BODY_LIMIT: usize = 512;

/// First [`LOG_BODY_LIMIT`] characters of `body`.
pub(crate) fn truncate(body: &str) -> &str {
    match body.char_indices().nth(LOG_BODY_LIMIT) {
        Some((index, _)) => &body[..index],
        None => body,
    }
}

/// `base` with `segments` appended as escaped path segments.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url, GatewayError> {
    let mut url = Url::parse(base)
        .map_err(|e| GatewayError::RequestFailed(format!("invalid gateway URL {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| GatewayError::RequestFailed(format!("gateway URL cannot be a base: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn fresh_reference() -> String {
    uuid::Uuid::new_v4().simple().to_string().to_uppercase()
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T, GatewayError> {
    serde_json::from_str(body).map_err(|e| GatewayError::ResponseParseFailed(e.to_string()))
}

fn observe<T>(operation: &'static str, result: Result<T, GatewayError>) -> Result<T, GatewayError> {
    let outcome = match &result {
        Ok(_) => "success",
        Err(err) => err.outcome(),
    };
    metrics::counter!("gateway_requests_total", "operation" => operation, "outcome" => outcome)
        .increment(1);
    result
}

fn unexpected(operation: &'static str, url: &Url, status: StatusCode, body: String) -> GatewayError {
    tracing::error!(
        operation,
        url = %url,
        status = status.as_u16(),
        body = %truncate(&body),
        "Gateway returned unexpected status"
    );
    GatewayError::Api {
        status: status.as_u16(),
        body,
    }
}

/// Client for the debit-OTP payment gateway.
#[derive(Clone)]
pub struct GatewayClient {
    http: Client,
    config: Arc<GatewayConfig>,
    tokens: Arc<TokenCache>,
    registry: Arc<BookingRegistry>,
    translator: StatusTranslator,
}

impl GatewayClient {
    /// Create a client that authenticates against the gateway's token endpoint.
    #[must_use]
    pub fn new(
        config: GatewayConfig,
        clock: Arc<dyn Clock>,
        registry: Arc<BookingRegistry>,
        catalog: Arc<dyn RaffleCatalog>,
    ) -> Self {
        let http = Client::new();
        let config = Arc::new(config);
        let source = Arc::new(HttpTokenSource::new(http.clone(), Arc::clone(&config)));
        let tokens = Arc::new(TokenCache::new(source, clock));
        Self::build(http, config, tokens, registry, catalog)
    }

    /// Create a client around an existing token cache.
    #[must_use]
    pub fn with_token_cache(
        config: GatewayConfig,
        tokens: Arc<TokenCache>,
        registry: Arc<BookingRegistry>,
        catalog: Arc<dyn RaffleCatalog>,
    ) -> Self {
        Self::build(Client::new(), Arc::new(config), tokens, registry, catalog)
    }

    fn build(
        http: Client,
        config: Arc<GatewayConfig>,
        tokens: Arc<TokenCache>,
        registry: Arc<BookingRegistry>,
        catalog: Arc<dyn RaffleCatalog>,
    ) -> Self {
        let translator = StatusTranslator::new(Arc::clone(&registry), catalog);
        Self {
            http,
            config,
            tokens,
            registry,
            translator,
        }
    }

    /// The shared token cache.
    #[must_use]
    pub const fn token_cache(&self) -> &Arc<TokenCache> {
        &self.tokens
    }

    /// Ask the gateway to send an OTP to the payer.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Validation`] for malformed input; nothing is sent
    /// - [`GatewayError::Unauthorized`] on 401, after clearing the cached token
    /// - [`GatewayError::Api`] for any status other than 200
    /// - [`GatewayError::Timeout`] or [`GatewayError::RequestFailed`] on transport failure
    pub async fn request_otp(&self, request: &DebitRequest) -> Result<OtpAck, GatewayError> {
        observe("request_otp", self.try_request_otp(request).await)
    }

    async fn try_request_otp(&self, request: &DebitRequest) -> Result<OtpAck, GatewayError> {
        const OPERATION: &str = "request_otp";

        request.validate()?;

        let payload = self.otp_payload(request);
        let url = endpoint(&self.config.base_url, &["api", "v1", "request", "otp"])?;
        let (status, body) = self
            .send(
                OPERATION,
                self.http.post(url.clone()).json(&payload),
                &url,
                self.config.mutation_timeout(),
            )
            .await?;

        if status != StatusCode::OK {
            return Err(unexpected(OPERATION, &url, status, body));
        }

        Ok(OtpAck::sent())
    }

    /// Execute the debit with the OTP the payer received.
    ///
    /// The booking's raffle is recorded in the registry once the request passes
    /// validation, before the gateway is called. The gateway's operation secret
    /// is discarded and never returned.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Validation`] for malformed input; nothing is recorded or sent
    /// - [`GatewayError::Unauthorized`] on 401, after clearing the cached token
    /// - [`GatewayError::Api`] for any non-2xx status
    /// - [`GatewayError::ResponseParseFailed`] if the 2xx body lacks a transaction id
    /// - [`GatewayError::Timeout`] or [`GatewayError::RequestFailed`] on transport failure
    pub async fn confirm_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<TransactionConfirmation, GatewayError> {
        observe(
            "confirm_transaction",
            self.try_confirm_transaction(request).await,
        )
    }

    async fn try_confirm_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<TransactionConfirmation, GatewayError> {
        const OPERATION: &str = "confirm_transaction";

        request.validate()?;

        self.registry
            .save_booking_raffle(request.booking_id.clone(), request.raffle_id.clone())
            .await;

        let payload = self.transaction_payload(request);
        let url = endpoint(&self.config.base_url, &["api", "v1", "transaction", "otp"])?;
        let (status, body) = self
            .send(
                OPERATION,
                self.http.post(url.clone()).json(&payload),
                &url,
                self.config.mutation_timeout(),
            )
            .await?;

        if !status.is_success() {
            return Err(unexpected(OPERATION, &url, status, body));
        }

        let created: TransactionCreated = parse(&body)?;
        let transaction_id = TransactionId::from(created.transaction_id);

        tracing::info!(
            booking_id = %request.booking_id,
            transaction_id = %transaction_id,
            tickets = request.tickets.len(),
            "Transaction created"
        );

        Ok(TransactionConfirmation::processed(transaction_id))
    }

    /// Fetch a transaction's status and translate it.
    ///
    /// A usable `booking_id` is remembered for the transaction; when it is absent
    /// or the placeholder, the remembered one is used instead. The operation
    /// secret is accepted for compatibility but neither forwarded nor logged.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Validation`] for a blank transaction id or blank secret
    /// - [`GatewayError::TransactionNotFound`] on 404
    /// - [`GatewayError::Unauthorized`] on 401, after clearing the cached token
    /// - [`GatewayError::Api`] for any other status than 200
    /// - [`GatewayError::Timeout`] or [`GatewayError::RequestFailed`] on transport failure
    pub async fn poll_status(
        &self,
        transaction_id: &TransactionId,
        operation_secret: Option<&Secret>,
        booking_id: Option<&BookingId>,
    ) -> Result<StatusReport, GatewayError> {
        observe(
            "poll_status",
            self.try_poll_status(transaction_id, operation_secret, booking_id)
                .await,
        )
    }

    async fn try_poll_status(
        &self,
        transaction_id: &TransactionId,
        operation_secret: Option<&Secret>,
        booking_id: Option<&BookingId>,
    ) -> Result<StatusReport, GatewayError> {
        const OPERATION: &str = "poll_status";

        if transaction_id.is_blank() {
            return Err(GatewayError::Validation(
                "transaction ID is required".to_string(),
            ));
        }
        if operation_secret.is_some_and(Secret::is_blank) {
            return Err(GatewayError::Validation(
                "operation secret must not be empty".to_string(),
            ));
        }

        let booking_id = match booking_id.filter(|b| b.is_usable()) {
            Some(booking_id) => {
                self.registry
                    .save_transaction_booking(transaction_id.clone(), booking_id.clone())
                    .await;
                Some(booking_id.clone())
            }
            None => {
                self.registry
                    .lookup_booking_by_transaction(transaction_id)
                    .await
            }
        };

        let url = endpoint(
            &self.config.base_url,
            &["api", "v1", "transaction", transaction_id.as_str()],
        )?;
        let (status, body) = self
            .send(
                OPERATION,
                self.http.get(url.clone()),
                &url,
                self.config.query_timeout(),
            )
            .await?;

        match status {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                tracing::info!(transaction_id = %transaction_id, "Transaction not found at gateway");
                return Err(GatewayError::TransactionNotFound(transaction_id.clone()));
            }
            status => return Err(unexpected(OPERATION, &url, status, body)),
        }

        let reported: TransactionStatus = parse(&body)?;
        let translated = self
            .translator
            .translate(&reported.status, &reported.rejected_code, booking_id.as_ref())
            .await;

        let transaction_id = if reported.transaction_id.trim().is_empty() {
            transaction_id.clone()
        } else {
            TransactionId::from(reported.transaction_id)
        };

        tracing::info!(
            transaction_id = %transaction_id,
            status = %translated.status,
            bless_numbers = translated.bless_numbers.len(),
            "Transaction status translated"
        );

        Ok(StatusReport {
            transaction_id,
            booking_id: booking_id.unwrap_or_else(|| BookingId::new("")),
            ref_ibp: reported.ref_ibp,
            status: translated.status,
            rsn: translated.reason,
            bless_numbers: translated.bless_numbers,
        })
    }

    /// Banks that support debit-OTP payments.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Unauthorized`] on 401, after clearing the cached token
    /// - [`GatewayError::Api`] for any status other than 200
    /// - [`GatewayError::ResponseParseFailed`] for a malformed bank list
    /// - [`GatewayError::Timeout`] or [`GatewayError::RequestFailed`] on transport failure
    pub async fn list_banks(&self) -> Result<Vec<BankSummary>, GatewayError> {
        observe("list_banks", self.try_list_banks().await)
    }

    async fn try_list_banks(&self) -> Result<Vec<BankSummary>, GatewayError> {
        const OPERATION: &str = "list_banks";

        let url = endpoint(&self.config.base_url, &["api", "v1", "banks"])?;
        let (status, body) = self
            .send(
                OPERATION,
                self.http.get(url.clone()),
                &url,
                self.config.catalog_timeout(),
            )
            .await?;

        if status != StatusCode::OK {
            return Err(unexpected(OPERATION, &url, status, body));
        }

        let banks: Vec<Bank> = parse(&body)?;
        Ok(banks
            .into_iter()
            .filter(|bank| bank.is_debit_otp)
            .map(BankSummary::from)
            .collect())
    }

    /// Attach auth headers, send, and read the body.
    ///
    /// Handles 401 for every operation; all other statuses are returned to the caller.
    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        url: &Url,
        timeout: Duration,
    ) -> Result<(StatusCode, String), GatewayError> {
        let authorization = self.tokens.authorization_header().await?;

        tracing::debug!(operation, url = %url, "Calling gateway");

        let response = request
            .header(header::AUTHORIZATION, authorization)
            .header(header::ACCEPT, "application/json")
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                let err = GatewayError::transport(operation, &e);
                tracing::error!(operation, url = %url, error = %err, "Gateway call failed");
                err
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| {
                let err = GatewayError::transport(operation, &e);
                tracing::error!(operation, url = %url, error = %err, "Gateway response body unreadable");
                err
            })?;

        tracing::info!(operation, url = %url, status = status.as_u16(), "Gateway responded");

        if status == StatusCode::UNAUTHORIZED {
            self.tokens.invalidate().await;
            tracing::warn!(operation, url = %url, "Gateway rejected bearer token");
            return Err(GatewayError::Unauthorized);
        }

        Ok((status, body))
    }

    fn otp_payload(&self, request: &DebitRequest) -> OtpRequestPayload {
        OtpRequestPayload {
            creditor_account: self.creditor_account(),
            debitor_document_info: DocumentInfo {
                kind: request.document_type.clone(),
                number: request.document_number.clone(),
            },
            debitor_account: Account {
                bank_code: request.bank_code.clone(),
                kind: DEBITOR_ACCOUNT_TYPE.to_string(),
                number: request.account_number.clone(),
            },
            amount: Amount {
                amt: request.amount,
                currency: request.currency.clone(),
            },
        }
    }

    fn transaction_payload(&self, request: &TransactionRequest) -> TransactionPayload {
        TransactionPayload {
            internal_id: fresh_reference(),
            group_id: fresh_reference(),
            account: self.creditor_account(),
            amount: AmountWithRate {
                amt: request.amount,
                currency: request.currency.clone(),
                use_day_rate: false,
            },
            concept: self.config.concept.clone(),
            notification_urls: NotificationUrls {
                web_hook_endpoint: self.config.webhook_url.clone(),
            },
            receiving_user: ReceivingUser {
                name: request.receiver_name.clone(),
                otp: request.receiver_otp.clone(),
                document_info: DocumentInfo {
                    kind: request.receiver_document_type.clone(),
                    number: request.receiver_document_number.clone(),
                },
                account: Account {
                    bank_code: request.receiver_bank_code.clone(),
                    kind: DEBITOR_ACCOUNT_TYPE.to_string(),
                    number: request.receiver_account_number.clone(),
                },
            },
        }
    }

    fn creditor_account(&self) -> Account {
        Account {
            bank_code: self.config.creditor_bank_code.clone(),
            kind: CREDITOR_ACCOUNT_TYPE.to_string(),
            number: self.config.creditor_account.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_appends_segments() {
        let url = endpoint("https://pruebas.sypago.net:8086", &["api", "v1", "banks"]).unwrap();
        assert_eq!(url.as_str(), "https://pruebas.sypago.net:8086/api/v1/banks");

        let url = endpoint("http://localhost:9000/gw/", &["api", "v1", "banks"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/gw/api/v1/banks");
    }

    #[test]
    fn test_endpoint_escapes_transaction_id() {
        let url = endpoint("http://localhost:9000", &["api", "v1", "transaction", "a/b c"]).unwrap();
        assert_eq!(url.path(), "/api/v1/transaction/a%2Fb%20c");
    }

    #[test]
    fn test_endpoint_rejects_garbage() {
        assert!(matches!(
            endpoint("not a url", &["api"]),
            Err(GatewayError::RequestFailed(_))
        ));
    }

    #[test]
    fn test_truncate_is_char_safe() {
        let body = "é".repeat(LOG_BODY_LIMIT + 10);
        assert_eq!(truncate(&body).chars().count(), LOG_BODY_LIMIT);
        assert_eq!(truncate("short"), "short");
    }

    #[test]
    fn test_fresh_reference_format() {
        let reference = fresh_reference();
        assert_eq!(reference.len(), 32);
        assert!(!reference.contains('-'));
        assert_eq!(reference, reference.to_uppercase());
    }
}
