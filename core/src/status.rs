//! Gateway transaction status translation.
//!
//! Maps the gateway's status vocabulary (`PEND`, `PROC`, `AC00`, `ACCP`, `RJCT`)
//! to a reason text and, once a transaction is accepted, derives the booking's
//! bonus ("bless") ticket.
//!
//! The bonus ticket is a pure function of the raffle's range, so polling the
//! same accepted transaction repeatedly always yields the same ticket.

use crate::catalog::RaffleCatalog;
use crate::registry::BookingRegistry;
use crate::types::{BookingId, Raffle, TicketNumber};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Transaction status as reported by the gateway.
///
/// Serializes to and from the gateway's four-letter code; codes outside the
/// known vocabulary are kept verbatim in [`GatewayStatus::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GatewayStatus {
    /// `PEND`
    Pending,
    /// `PROC`
    Processing,
    /// `AC00`
    InProcess,
    /// `ACCP`
    Accepted,
    /// `RJCT`
    Rejected,
    /// Any other code
    Unknown(String),
}

impl GatewayStatus {
    /// Parse a gateway status code.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "PEND" => Self::Pending,
            "PROC" => Self::Processing,
            "AC00" => Self::InProcess,
            "ACCP" => Self::Accepted,
            "RJCT" => Self::Rejected,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The gateway code, verbatim.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Pending => "PEND",
            Self::Processing => "PROC",
            Self::InProcess => "AC00",
            Self::Accepted => "ACCP",
            Self::Rejected => "RJCT",
            Self::Unknown(code) => code,
        }
    }

    /// Domain status name.
    #[must_use]
    pub const fn domain_status(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::InProcess => "in process",
            Self::Accepted => "accepted and processed",
            Self::Rejected => "rejected",
            Self::Unknown(_) => "unknown",
        }
    }

    /// Human-readable reason, including the rejection code when there is one.
    #[must_use]
    pub fn reason(&self, rejected_code: &str) -> String {
        match self {
            Self::Pending => "Transaction pending".to_string(),
            Self::Processing => "Transaction processing".to_string(),
            Self::InProcess => "Transaction in process".to_string(),
            Self::Accepted => "Transaction accepted and processed successfully".to_string(),
            Self::Rejected if rejected_code.is_empty() => "Transaction rejected".to_string(),
            Self::Rejected => format!("Transaction rejected - code: {rejected_code}"),
            Self::Unknown(code) => format!("Unknown status: {code}"),
        }
    }

    /// Whether the gateway has settled the transaction successfully.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

impl From<String> for GatewayStatus {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<GatewayStatus> for String {
    fn from(status: GatewayStatus) -> Self {
        status.code().to_string()
    }
}

impl fmt::Display for GatewayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The bonus ticket for a raffle: a third of the way into its range, or the
/// midpoint if that falls outside. `None` for an empty raffle.
#[must_use]
pub fn bless_number(raffle: &Raffle) -> Option<TicketNumber> {
    if raffle.tickets_total <= 0 {
        return None;
    }

    let third = raffle.initial_ticket + raffle.tickets_total / 3;
    if raffle.contains(third) {
        Some(third)
    } else {
        Some(raffle.initial_ticket + raffle.tickets_total / 2)
    }
}

/// Outcome of translating a gateway status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedStatus {
    /// Parsed status
    pub status: GatewayStatus,
    /// Reason text
    pub reason: String,
    /// Bonus tickets; exactly one for an accepted transaction with a known raffle
    pub bless_numbers: Vec<TicketNumber>,
}

/// Translates gateway statuses using the registry to find a booking's raffle.
#[derive(Clone)]
pub struct StatusTranslator {
    registry: Arc<BookingRegistry>,
    catalog: Arc<dyn RaffleCatalog>,
}

impl StatusTranslator {
    /// Create a translator.
    #[must_use]
    pub fn new(registry: Arc<BookingRegistry>, catalog: Arc<dyn RaffleCatalog>) -> Self {
        Self { registry, catalog }
    }

    /// Translate `code` for `booking_id`.
    ///
    /// Unknown codes translate to an "Unknown status" reason rather than failing.
    /// Bonus tickets are only derived for `ACCP`; the list is empty when the
    /// booking has no recorded raffle.
    pub async fn translate(
        &self,
        code: &str,
        rejected_code: &str,
        booking_id: Option<&BookingId>,
    ) -> TranslatedStatus {
        let status = GatewayStatus::from_code(code);
        let reason = status.reason(rejected_code);

        let bless_numbers = if status.is_accepted() {
            self.bless_numbers_for(booking_id).await
        } else {
            Vec::new()
        };

        TranslatedStatus {
            status,
            reason,
            bless_numbers,
        }
    }

    async fn bless_numbers_for(&self, booking_id: Option<&BookingId>) -> Vec<TicketNumber> {
        let Some(booking_id) = booking_id else {
            return Vec::new();
        };

        let Some(raffle_id) = self.registry.lookup_raffle_by_booking(booking_id).await else {
            tracing::warn!(booking_id = %booking_id, "No raffle recorded for accepted booking");
            return Vec::new();
        };

        self.catalog
            .raffle(&raffle_id)
            .as_ref()
            .and_then(bless_number)
            .into_iter()
            .collect()
    }
}
