//! # Raffle Pay Core
//!
//! Domain types and in-process state for selling raffle tickets against an
//! external debit-OTP payment gateway.
//!
//! This crate holds everything that does not talk to the network:
//!
//! - **Catalog**: the raffles on sale and their ticket-number ranges
//! - **Draws**: simulated sold-ticket lists, winners and prizes
//! - **Reservation**: ticket availability checks that produce bookings
//! - **Registry**: booking ↔ raffle and transaction ↔ booking associations
//! - **Status**: translation of gateway transaction codes, including the
//!   deterministic bonus ("bless") ticket
//!
//! The gateway client in `raffle-pay-gateway` builds on these pieces.
//!
//! ## Example
//!
//! ```
//! use raffle_pay_core::{
//!     MockRaffleCatalog, RaffleCatalog, RaffleId, ReservationEngine, ReservationOutcome,
//!     environment::SystemClock,
//!     reservation::RandomAvailability,
//! };
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(MockRaffleCatalog::new(Arc::new(SystemClock)));
//! let engine = ReservationEngine::new(catalog, Arc::new(RandomAvailability::new(1.0)));
//!
//! let outcome = engine.reserve(&RaffleId::from("raffle-002"), &[1001, 1002]).unwrap();
//! assert!(matches!(outcome, ReservationOutcome::Confirmed { .. }));
//! ```

pub mod catalog;
pub mod draws;
pub mod error;
pub mod registry;
pub mod reservation;
pub mod status;
pub mod types;

// Re-export commonly used types
pub use catalog::{MockRaffleCatalog, RaffleCatalog};
pub use error::ReservationError;
pub use registry::BookingRegistry;
pub use reservation::{AvailabilityOracle, ReservationEngine, ReservationOutcome};
pub use status::{GatewayStatus, StatusTranslator, TranslatedStatus};
pub use types::{BookingId, Raffle, RaffleId, TicketNumber, TransactionId};

/// Environment module - injected dependencies
///
/// All time-dependent components read the current time through [`environment::Clock`]
/// so tests can pin or advance it.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use raffle_pay_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let before = clock.now();
    /// assert!(clock.now() >= before);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
