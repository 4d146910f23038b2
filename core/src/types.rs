//! Domain identifiers and the raffle summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A ticket number within a raffle.
pub type TicketNumber = i64;

/// Prefix of every generated booking identifier.
pub const BOOKING_ID_PREFIX: &str = "BK-";

/// Booking identifier some callers send when they have no real booking.
pub const PLACEHOLDER_BOOKING_ID: &str = "BK-DEFAULT";

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the identifier is empty or whitespace only.
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Raffle identifier (e.g. `raffle-001`).
    RaffleId
);

string_id!(
    /// Internal booking identifier correlating reservation, payment and polling.
    BookingId
);

string_id!(
    /// Transaction identifier assigned by the payment gateway.
    TransactionId
);

impl BookingId {
    /// Generate a fresh booking identifier: `BK-` followed by 32 uppercase hex digits.
    #[must_use]
    pub fn generate() -> Self {
        let hex = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
        Self(format!("{BOOKING_ID_PREFIX}{hex}"))
    }

    /// Whether this identifier can be used to correlate a transaction.
    ///
    /// Empty identifiers and the `BK-DEFAULT` placeholder are not usable.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.is_blank() && self.0 != PLACEHOLDER_BOOKING_ID
    }
}

/// Summary of a raffle on sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Raffle {
    /// Raffle identifier
    pub id: RaffleId,
    /// Display title
    pub title: String,
    /// One-line description
    pub short_description: String,
    /// Cover image URL
    pub cover_image_url: String,
    /// Ticket price
    pub price: f64,
    /// ISO currency code of `price`
    pub currency: String,
    /// First valid ticket number
    pub initial_ticket: TicketNumber,
    /// Number of tickets in the raffle
    pub tickets_total: TicketNumber,
    /// When sales close
    pub ends_at: DateTime<Utc>,
    /// Featured raffle flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_main: Option<bool>,
    /// Tickets sold so far
    pub total_sold: TicketNumber,
}

impl Raffle {
    /// One past the last valid ticket number.
    #[must_use]
    pub const fn end_ticket(&self) -> TicketNumber {
        self.initial_ticket + self.tickets_total
    }

    /// Last valid ticket number.
    #[must_use]
    pub const fn last_ticket(&self) -> TicketNumber {
        self.end_ticket() - 1
    }

    /// Whether `ticket` lies in `[initial_ticket, initial_ticket + tickets_total)`.
    #[must_use]
    pub const fn contains(&self, ticket: TicketNumber) -> bool {
        ticket >= self.initial_ticket && ticket < self.end_ticket()
    }
}
