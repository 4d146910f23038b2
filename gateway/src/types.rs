//! Payload types.
//!
//! Two families live here:
//!
//! - **Caller payloads**: flat records accepted from and returned to the web layer
//! - **Wire payloads**: the gateway's nested JSON shapes. Field names are fixed by
//!   the gateway and must not change.

use raffle_pay_core::{BookingId, GatewayStatus, RaffleId, TicketNumber, TransactionId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account type of the creditor (merchant) account.
pub const CREDITOR_ACCOUNT_TYPE: &str = "CNTA";

/// Account type of a payer's account.
pub const DEBITOR_ACCOUNT_TYPE: &str = "CELE";

/// A confidential string: bearer tokens, API keys, OTPs and operation secrets.
///
/// `Debug` and `Display` never print the value.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wrap a confidential value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The underlying value. Do not log it.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the value is empty or whitespace only.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Caller payloads
// ═══════════════════════════════════════════════════════════════════════

/// Request to send an OTP to the payer's phone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebitRequest {
    /// Document type letter (`V`, `E`, `J` or `G`)
    #[serde(rename = "document_letter")]
    pub document_type: String,
    /// Document number
    #[serde(rename = "document")]
    pub document_number: String,
    /// Payer's bank code
    pub bank_code: String,
    /// Payer's account or phone number
    pub account_number: String,
    /// Amount to debit
    pub amount: f64,
    /// `VES` or `USD`
    pub currency: String,
}

/// Request to execute a debit with the OTP the payer received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Booking issued by the reservation step
    pub booking_id: BookingId,
    /// Participant paying
    pub participant_id: String,
    /// Raffle the tickets belong to
    pub raffle_id: RaffleId,
    /// Reserved tickets
    pub tickets: Vec<TicketNumber>,
    /// Payer's name
    pub receiver_name: String,
    /// OTP received by the payer
    pub receiver_otp: Secret,
    /// Document type letter
    pub receiver_document_type: String,
    /// Document number
    pub receiver_document_number: String,
    /// Payer's bank code
    pub receiver_bank_code: String,
    /// Payer's account or phone number
    pub receiver_account_number: String,
    /// Amount to debit
    pub amount: f64,
    /// `VES` or `USD`
    pub currency: String,
}

/// Acknowledgement of an OTP request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpAck {
    /// Always `true`
    pub success: bool,
    /// Fixed message
    pub message: String,
    /// Always 200
    pub code: u16,
}

impl OtpAck {
    pub(crate) fn sent() -> Self {
        Self {
            success: true,
            message: "OTP request processed successfully".to_string(),
            code: 200,
        }
    }
}

/// Result of a confirmed transaction. Never carries the operation secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionConfirmation {
    /// Always `true`
    pub success: bool,
    /// Fixed message
    pub message: String,
    /// Always 200
    pub code: u16,
    /// Gateway's transaction identifier
    pub transaction_id: TransactionId,
}

impl TransactionConfirmation {
    pub(crate) fn processed(transaction_id: TransactionId) -> Self {
        Self {
            success: true,
            message: "Transaction processed successfully".to_string(),
            code: 200,
            transaction_id,
        }
    }
}

/// Current state of a transaction as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Gateway's transaction identifier
    pub transaction_id: TransactionId,
    /// Booking the transaction was resolved to (empty when unknown)
    pub booking_id: BookingId,
    /// Interbank reference
    pub ref_ibp: String,
    /// Gateway status code, verbatim
    pub status: GatewayStatus,
    /// Reason text
    pub rsn: String,
    /// Bonus tickets awarded on acceptance
    pub bless_numbers: Vec<TicketNumber>,
}

/// A bank that supports debit-OTP payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankSummary {
    /// Bank code
    pub code: String,
    /// Display name
    pub name: String,
}

// ═══════════════════════════════════════════════════════════════════════
// Wire payloads
// ═══════════════════════════════════════════════════════════════════════

/// Bank account reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    /// Bank code
    pub bank_code: String,
    /// `CNTA` or `CELE`
    #[serde(rename = "type")]
    pub kind: String,
    /// Account or phone number
    pub number: String,
}

/// Identity document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentInfo {
    /// Document type letter
    #[serde(rename = "type")]
    pub kind: String,
    /// Document number
    pub number: String,
}

/// Amount of an OTP request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amount {
    /// Value
    pub amt: f64,
    /// Currency code
    pub currency: String,
}

/// Amount of a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountWithRate {
    /// Value
    pub amt: f64,
    /// Currency code
    pub currency: String,
    /// Convert at the day's rate; always `false`
    pub use_day_rate: bool,
}

/// Webhook the gateway notifies on settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationUrls {
    /// Webhook URL
    pub web_hook_endpoint: String,
}

/// Payer of a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceivingUser {
    /// Payer's name
    pub name: String,
    /// OTP
    pub otp: Secret,
    /// Payer's document
    pub document_info: DocumentInfo,
    /// Payer's account
    pub account: Account,
}

/// Body of `POST /api/v1/auth/token`.
#[derive(Debug, Clone, Serialize)]
pub struct AuthRequest<'a> {
    /// Client identifier
    pub client_id: &'a str,
    /// API key
    pub secret: &'a Secret,
}

/// Response of `POST /api/v1/auth/token`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Bearer token
    pub access_token: Secret,
    /// Lifetime in seconds
    pub expires_in: i64,
    /// Usually `Bearer`
    #[serde(default)]
    pub token_type: String,
}

/// Body of `POST /api/v1/request/otp`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OtpRequestPayload {
    /// Merchant account receiving the funds
    pub creditor_account: Account,
    /// Payer's document
    pub debitor_document_info: DocumentInfo,
    /// Payer's account
    pub debitor_account: Account,
    /// Amount
    pub amount: Amount,
}

/// Body of `POST /api/v1/transaction/otp`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionPayload {
    /// Fresh uppercase UUID without dashes
    pub internal_id: String,
    /// Fresh uppercase UUID without dashes
    pub group_id: String,
    /// Merchant account receiving the funds
    pub account: Account,
    /// Amount
    pub amount: AmountWithRate,
    /// Statement concept
    pub concept: String,
    /// Settlement webhook
    pub notification_urls: NotificationUrls,
    /// Payer
    pub receiving_user: ReceivingUser,
}

/// Response of `POST /api/v1/transaction/otp`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionCreated {
    /// Gateway's transaction identifier
    pub transaction_id: String,
    /// Secret tied to the transaction; never returned to callers
    #[serde(default)]
    pub operation_secret: Secret,
}

/// Amount block of a status response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusAmount {
    /// Amount type
    #[serde(rename = "type")]
    pub kind: String,
    /// Requested amount
    pub amt: f64,
    /// Amount actually debited
    pub pay_amt: f64,
    /// Currency code
    pub currency: String,
    /// Exchange rate applied
    pub rate: f64,
    /// Whether the day's rate was used
    pub use_day_rate: bool,
}

/// Payer block of a status response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusReceivingUser {
    /// Payer's name
    pub name: String,
    /// Payer's document
    pub document_info: DocumentInfo,
    /// Payer's account
    pub account: Account,
}

/// Response of `GET /api/v1/transaction/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionStatus {
    /// Merchant-side identifier sent on creation
    pub internal_id: String,
    /// Gateway's transaction identifier
    pub transaction_id: String,
    /// Interbank reference
    pub ref_ibp: String,
    /// Group identifier sent on creation
    pub group_id: String,
    /// Operation timestamp as sent by the gateway
    pub operation_date: String,
    /// Amount details
    pub amount: StatusAmount,
    /// Payer details
    pub receiving_user: StatusReceivingUser,
    /// Status code (`PEND`, `PROC`, `AC00`, `ACCP`, `RJCT`)
    pub status: String,
    /// Rejection code, if rejected
    pub rejected_code: String,
    /// Expiration in seconds
    pub expiration: i64,
}

/// Entry of `GET /api/v1/banks`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Bank {
    /// Bank code
    pub code: String,
    /// Display name
    pub name: String,
    /// Whether the bank is active
    pub active: bool,
    /// Whether the bank is itself a gateway client
    pub sypago_client: bool,
    /// Transition-account support
    pub enable_transition_account: bool,
    /// Verification type
    pub verify_type: i32,
    /// SMS OTP support
    pub is_sms_otp: bool,
    /// SMS OTP short code
    pub sms_otp_address: String,
    /// SMS OTP message text
    pub sms_otp_text: String,
    /// Debit-OTP support
    #[serde(rename = "IsDebitOTP")]
    pub is_debit_otp: bool,
    /// Whether account validation is disabled
    pub disabled_validation_account: bool,
}

impl From<Bank> for BankSummary {
    fn from(bank: Bank) -> Self {
        Self {
            code: bank.code,
            name: bank.name,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_debug_is_redacted() {
        let otp = Secret::from("123456");
        assert_eq!(format!("{otp:?}"), "Secret([REDACTED])");
        assert_eq!(otp.to_string(), "[REDACTED]");
        assert_eq!(otp.expose(), "123456");
    }

    #[test]
    fn test_transaction_request_debug_hides_otp() {
        let request: TransactionRequest = serde_json::from_value(serde_json::json!({
            "booking_id": "BK-1",
            "participant_id": "P-1",
            "raffle_id": "raffle-001",
            "tickets": [1, 2],
            "receiver_name": "Ana",
            "receiver_otp": "987654",
            "receiver_document_type": "V",
            "receiver_document_number": "12345678",
            "receiver_bank_code": "0105",
            "receiver_account_number": "04141234567",
            "amount": 50.0,
            "currency": "VES"
        }))
        .unwrap();

        assert!(!format!("{request:?}").contains("987654"));
        assert_eq!(request.receiver_otp.expose(), "987654");
    }

    #[test]
    fn test_bank_wire_names() {
        let bank: Bank = serde_json::from_value(serde_json::json!({
            "Code": "0105",
            "Name": "Mercantil",
            "IsDebitOTP": true,
            "VerifyType": 2
        }))
        .unwrap();

        assert!(bank.is_debit_otp);
        assert_eq!(bank.verify_type, 2);
        assert_eq!(
            BankSummary::from(bank),
            BankSummary {
                code: "0105".to_string(),
                name: "Mercantil".to_string()
            }
        );
    }

    #[test]
    fn test_status_report_uses_verbatim_code() {
        let report = StatusReport {
            transaction_id: TransactionId::from("TX-1"),
            booking_id: BookingId::from("BK-1"),
            ref_ibp: "REF".to_string(),
            status: GatewayStatus::Accepted,
            rsn: GatewayStatus::Accepted.reason(""),
            bless_numbers: vec![1267],
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "ACCP");
        assert_eq!(json["bless_numbers"], serde_json::json!([1267]));
    }
}
