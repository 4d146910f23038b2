//! Debit-OTP payment endpoints.
//!
//! Thin adapters over [`GatewayClient`]: the client validates, talks to the
//! gateway and translates statuses; these handlers only extract and respond.

#![allow(clippy::missing_errors_doc)]

use crate::error::AppError;
use axum::{
    Json,
    extract::{Query, State, rejection::{JsonRejection, QueryRejection}},
};
use raffle_pay_core::{BookingId, TransactionId};
use raffle_pay_gateway::{
    BankSummary, DebitRequest, GatewayClient, OtpAck, Secret, StatusReport,
    TransactionConfirmation, TransactionRequest,
};
use serde::Deserialize;
use std::sync::Arc;

/// Query of the status endpoint.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    /// Gateway transaction to look up
    pub transaction_id: Option<String>,
    /// Booking the transaction pays for, if the caller knows it
    pub booking_id: Option<String>,
    /// Operation secret returned at confirmation
    pub operation_secret: Option<Secret>,
}

/// Banks that support debit-OTP payments.
///
/// `GET /api/v1/sypago/banks`
pub async fn list_banks(
    State(gateway): State<Arc<GatewayClient>>,
) -> Result<Json<Vec<BankSummary>>, AppError> {
    let banks = gateway.list_banks().await?;
    Ok(Json(banks))
}

/// Ask the payer's bank to send an OTP.
///
/// `POST /api/v1/sypago/debit/request-otp`
pub async fn request_otp(
    State(gateway): State<Arc<GatewayClient>>,
    payload: Result<Json<DebitRequest>, JsonRejection>,
) -> Result<Json<OtpAck>, AppError> {
    let Json(request) = payload?;
    let ack = gateway.request_otp(&request).await?;
    Ok(Json(ack))
}

/// Execute the debit with the OTP the payer received.
///
/// `POST /api/v1/sypago/debit/transaction-otp`
pub async fn confirm_transaction(
    State(gateway): State<Arc<GatewayClient>>,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> Result<Json<TransactionConfirmation>, AppError> {
    let Json(request) = payload?;
    let confirmation = gateway.confirm_transaction(&request).await?;
    Ok(Json(confirmation))
}

/// Current status of a transaction.
///
/// `GET /api/v1/sypago/debit/transaction/status?transaction_id=&booking_id=&operation_secret=`
pub async fn transaction_status(
    State(gateway): State<Arc<GatewayClient>>,
    query: Result<Query<StatusQuery>, QueryRejection>,
) -> Result<Json<StatusReport>, AppError> {
    let Query(query) = query?;
    let transaction_id = query
        .transaction_id
        .filter(|id| !id.trim().is_empty())
        .map(TransactionId::from)
        .ok_or_else(|| AppError::bad_request("transaction_id is required"))?;
    let booking_id = query.booking_id.map(BookingId::from);

    let report = gateway
        .poll_status(
            &transaction_id,
            query.operation_secret.as_ref(),
            booking_id.as_ref(),
        )
        .await?;

    Ok(Json(report))
}
