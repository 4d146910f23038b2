//! Caller input validation.
//!
//! Runs before any network call; the first failing rule is reported.

use crate::error::GatewayError;
use crate::types::{DebitRequest, TransactionRequest};

/// Accepted document type letters.
pub const VALID_DOCUMENT_TYPES: [&str; 4] = ["V", "E", "J", "G"];

/// Accepted currencies.
pub const VALID_CURRENCIES: [&str; 2] = ["VES", "USD"];

fn required(value: &str, what: &str) -> Result<(), GatewayError> {
    if value.trim().is_empty() {
        return Err(GatewayError::Validation(format!("{what} is required")));
    }
    Ok(())
}

fn check_amount_and_codes(
    amount: f64,
    currency: &str,
    document_type: &str,
) -> Result<(), GatewayError> {
    if amount.is_nan() || amount <= 0.0 {
        return Err(GatewayError::Validation(
            "amount must be greater than 0".to_string(),
        ));
    }

    required(currency, "currency")?;

    if !VALID_DOCUMENT_TYPES.contains(&document_type) {
        return Err(GatewayError::Validation(format!(
            "invalid document type: {document_type} (valid: V, E, J, G)"
        )));
    }

    if !VALID_CURRENCIES.contains(&currency) {
        return Err(GatewayError::Validation(format!(
            "invalid currency: {currency} (valid: VES, USD)"
        )));
    }

    Ok(())
}

impl DebitRequest {
    /// Check required fields, amount, document type and currency.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] describing the first failing rule.
    pub fn validate(&self) -> Result<(), GatewayError> {
        required(&self.document_type, "debitor document type")?;
        required(&self.document_number, "debitor document number")?;
        required(&self.bank_code, "debitor bank code")?;
        required(&self.account_number, "debitor account number")?;
        check_amount_and_codes(self.amount, &self.currency, &self.document_type)
    }
}

impl TransactionRequest {
    /// Check booking context, receiver fields, amount, codes and tickets.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] describing the first failing rule.
    pub fn validate(&self) -> Result<(), GatewayError> {
        required(self.booking_id.as_str(), "booking ID")?;
        required(&self.participant_id, "participant ID")?;
        required(self.raffle_id.as_str(), "raffle ID")?;

        if self.tickets.is_empty() {
            return Err(GatewayError::Validation(
                "at least one ticket is required".to_string(),
            ));
        }

        required(&self.receiver_name, "receiver name")?;
        required(self.receiver_otp.expose(), "receiver OTP")?;
        required(&self.receiver_document_type, "receiver document type")?;
        required(&self.receiver_document_number, "receiver document number")?;
        required(&self.receiver_bank_code, "receiver bank code")?;
        required(&self.receiver_account_number, "receiver account number")?;

        check_amount_and_codes(self.amount, &self.currency, &self.receiver_document_type)?;

        if let Some(ticket) = self.tickets.iter().find(|&&t| t <= 0) {
            return Err(GatewayError::Validation(format!(
                "ticket numbers must be positive: {ticket}"
            )));
        }

        Ok(())
    }
}
