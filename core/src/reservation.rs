//! Ticket reservation.
//!
//! There is no ledger of sold tickets: availability is decided per ticket by an
//! [`AvailabilityOracle`]. Production uses [`RandomAvailability`], which accepts
//! each ticket with a fixed probability to model contention; tests substitute a
//! deterministic oracle. Because nothing is recorded, two reservations may
//! confirm overlapping tickets, and repeating a call can give a different result.
//!
//! # Outcomes
//!
//! ```text
//! reserve(raffle, tickets)
//!   ├── Err(MissingFields)        empty raffle id or ticket list
//!   ├── Err(RaffleNotFound)       unknown raffle
//!   ├── Err(InvalidTicketRange)   any ticket outside the raffle's range
//!   ├── Ok(Conflict { .. })       some tickets unavailable
//!   └── Ok(Confirmed { .. })      every ticket available, booking id issued
//! ```

use crate::catalog::RaffleCatalog;
use crate::error::ReservationError;
use crate::types::{BookingId, Raffle, RaffleId, TicketNumber};
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;

/// Probability that a single ticket is still available.
pub const DEFAULT_AVAILABILITY: f64 = 0.8;

/// Decides whether a ticket can still be sold.
pub trait AvailabilityOracle: Send + Sync {
    /// Whether `ticket` of `raffle` is available right now.
    fn is_available(&self, raffle: &Raffle, ticket: TicketNumber) -> bool;
}

/// Accepts each ticket independently with a fixed probability.
#[derive(Debug, Clone, Copy)]
pub struct RandomAvailability {
    probability: f64,
}

impl RandomAvailability {
    /// Create an oracle accepting tickets with `probability`, clamped to `[0, 1]`.
    #[must_use]
    pub fn new(probability: f64) -> Self {
        let probability = if probability.is_nan() {
            DEFAULT_AVAILABILITY
        } else {
            probability.clamp(0.0, 1.0)
        };
        Self { probability }
    }

    /// An oracle that accepts every ticket.
    #[must_use]
    pub const fn always() -> Self {
        Self { probability: 1.0 }
    }

    /// Acceptance probability.
    #[must_use]
    pub const fn probability(&self) -> f64 {
        self.probability
    }
}

impl Default for RandomAvailability {
    fn default() -> Self {
        Self::new(DEFAULT_AVAILABILITY)
    }
}

impl AvailabilityOracle for RandomAvailability {
    fn is_available(&self, _raffle: &Raffle, _ticket: TicketNumber) -> bool {
        rand::thread_rng().gen_bool(self.probability)
    }
}

/// Result of a reservation attempt that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationOutcome {
    /// Every requested ticket was available.
    Confirmed {
        /// Reserved tickets, in request order
        tickets: Vec<TicketNumber>,
        /// Booking identifier for the payment steps
        booking_id: BookingId,
    },
    /// Some tickets were taken; nothing was reserved.
    Conflict {
        /// Tickets the caller asked for (duplicates removed)
        requested: Vec<TicketNumber>,
        /// Tickets that were available
        available: Vec<TicketNumber>,
        /// Tickets that were not
        conflict: Vec<TicketNumber>,
    },
}

/// Validates ticket requests against the catalog and draws availability.
#[derive(Clone)]
pub struct ReservationEngine {
    catalog: Arc<dyn RaffleCatalog>,
    oracle: Arc<dyn AvailabilityOracle>,
}

impl ReservationEngine {
    /// Create an engine over `catalog` using `oracle` for availability.
    #[must_use]
    pub fn new(catalog: Arc<dyn RaffleCatalog>, oracle: Arc<dyn AvailabilityOracle>) -> Self {
        Self { catalog, oracle }
    }

    /// Try to reserve `tickets` in `raffle_id`.
    ///
    /// Duplicate ticket numbers are collapsed, keeping the first occurrence, so
    /// `available` and `conflict` always partition `requested`.
    ///
    /// # Errors
    ///
    /// - [`ReservationError::MissingFields`] for an empty raffle id or ticket list
    /// - [`ReservationError::RaffleNotFound`] for an unknown raffle
    /// - [`ReservationError::InvalidTicketRange`] if any ticket is out of range;
    ///   the whole request fails rather than dropping the ticket
    pub fn reserve(
        &self,
        raffle_id: &RaffleId,
        tickets: &[TicketNumber],
    ) -> Result<ReservationOutcome, ReservationError> {
        if raffle_id.is_blank() {
            return Err(ReservationError::MissingFields("raffleId".to_string()));
        }

        let raffle = self
            .catalog
            .raffle(raffle_id)
            .ok_or_else(|| ReservationError::RaffleNotFound(raffle_id.clone()))?;

        if let Some(&ticket) = tickets.iter().find(|&&t| !raffle.contains(t)) {
            return Err(ReservationError::InvalidTicketRange {
                ticket,
                raffle_id: raffle.id.clone(),
                first: raffle.initial_ticket,
                last: raffle.last_ticket(),
            });
        }

        if tickets.is_empty() {
            return Err(ReservationError::MissingFields(
                "at least one ticket number".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(tickets.len());
        let requested: Vec<TicketNumber> =
            tickets.iter().copied().filter(|t| seen.insert(*t)).collect();

        let (available, conflict): (Vec<_>, Vec<_>) = requested
            .iter()
            .copied()
            .partition(|&t| self.oracle.is_available(&raffle, t));

        if !conflict.is_empty() {
            metrics::counter!("reservations_total", "outcome" => "conflict").increment(1);
            tracing::info!(
                raffle_id = %raffle.id,
                requested = requested.len(),
                conflicts = conflict.len(),
                "Tickets not available"
            );
            return Ok(ReservationOutcome::Conflict {
                requested,
                available,
                conflict,
            });
        }

        let booking_id = BookingId::generate();
        metrics::counter!("reservations_total", "outcome" => "confirmed").increment(1);
        tracing::info!(
            raffle_id = %raffle.id,
            booking_id = %booking_id,
            tickets = available.len(),
            "Tickets reserved"
        );

        Ok(ReservationOutcome::Confirmed {
            tickets: available,
            booking_id,
        })
    }
}
