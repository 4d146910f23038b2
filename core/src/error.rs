//! Error types for ticket reservation.

use crate::types::{RaffleId, TicketNumber};
use thiserror::Error;

/// Reasons a reservation request is rejected outright.
///
/// Ticket contention is not an error: it is reported as
/// [`ReservationOutcome::Conflict`](crate::ReservationOutcome::Conflict) so the
/// caller can offer different numbers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReservationError {
    /// A required field was missing or empty.
    #[error("Missing required fields: {0}")]
    MissingFields(String),

    /// No raffle exists with this identifier.
    #[error("No raffle found with ID: {0}")]
    RaffleNotFound(RaffleId),

    /// A requested ticket lies outside the raffle's range.
    #[error(
        "Ticket number {ticket} is not valid for raffle {raffle_id}. Valid range: {first}-{last}"
    )]
    InvalidTicketRange {
        /// The offending ticket
        ticket: TicketNumber,
        /// Raffle the request named
        raffle_id: RaffleId,
        /// First valid ticket
        first: TicketNumber,
        /// Last valid ticket
        last: TicketNumber,
    },
}
