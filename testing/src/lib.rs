//! # Raffle Pay Testing
//!
//! Deterministic test doubles for the Raffle Pay crates.
//!
//! This crate provides:
//! - Clocks that stand still or move only when told to
//! - An availability oracle with a fixed set of taken tickets
//! - A token source that counts how often it was asked for a token
//! - proptest strategies for ticket requests
//!
//! ## Example
//!
//! ```
//! use raffle_pay_core::environment::Clock;
//! use raffle_pay_testing::mocks::ManualClock;
//!
//! let clock = ManualClock::at_test_epoch();
//! let start = clock.now();
//! clock.advance_secs(60);
//! assert_eq!((clock.now() - start).num_seconds(), 60);
//! ```

use chrono::{DateTime, Utc};
use raffle_pay_core::environment::Clock;

/// Mock implementations of environment traits and collaborators.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use raffle_pay_core::reservation::AvailabilityOracle;
    use raffle_pay_core::{Raffle, TicketNumber};
    use raffle_pay_gateway::{GatewayError, IssuedToken, Secret, TokenSource};
    use std::collections::HashSet;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex, PoisonError};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use raffle_pay_testing::mocks::FixedClock;
    /// use raffle_pay_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// 2025-01-01 00:00:00 UTC
    #[must_use]
    pub fn test_epoch() -> DateTime<Utc> {
        DateTime::from_timestamp(1_735_689_600, 0).unwrap_or_default()
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(test_epoch())
    }

    /// Clock that only moves when a test moves it.
    ///
    /// Clones share the same time, so a test can keep one handle and hand an
    /// `Arc` of another to the code under test.
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        now: Arc<Mutex<DateTime<Utc>>>,
    }

    impl ManualClock {
        /// Start at `time`.
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                now: Arc::new(Mutex::new(time)),
            }
        }

        /// Start at [`test_epoch`].
        #[must_use]
        pub fn at_test_epoch() -> Self {
            Self::new(test_epoch())
        }

        /// Jump to `time`.
        pub fn set(&self, time: DateTime<Utc>) {
            *self.now.lock().unwrap_or_else(PoisonError::into_inner) = time;
        }

        /// Move forward by `by`.
        pub fn advance(&self, by: chrono::Duration) {
            let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
            *now += by;
        }

        /// Move forward by `secs` seconds.
        pub fn advance_secs(&self, secs: i64) {
            self.advance(chrono::Duration::seconds(secs));
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// Availability oracle with a fixed set of taken tickets.
    #[derive(Debug, Clone, Default)]
    pub struct FixedAvailability {
        taken: HashSet<TicketNumber>,
    }

    impl FixedAvailability {
        /// Every ticket is available.
        #[must_use]
        pub fn all_available() -> Self {
            Self::default()
        }

        /// The given tickets are taken; all others are available.
        #[must_use]
        pub fn taken(tickets: impl IntoIterator<Item = TicketNumber>) -> Self {
            Self {
                taken: tickets.into_iter().collect(),
            }
        }
    }

    impl AvailabilityOracle for FixedAvailability {
        fn is_available(&self, _raffle: &Raffle, ticket: TicketNumber) -> bool {
            !self.taken.contains(&ticket)
        }
    }

    /// Token source that issues `token-1`, `token-2`, ... and counts calls.
    #[derive(Debug)]
    pub struct CountingTokenSource {
        calls: AtomicUsize,
        expires_in: i64,
    }

    impl CountingTokenSource {
        /// Issue tokens living `expires_in` seconds.
        #[must_use]
        pub const fn new(expires_in: i64) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                expires_in,
            }
        }

        /// How many tokens have been issued.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Default for CountingTokenSource {
        fn default() -> Self {
            Self::new(3600)
        }
    }

    impl TokenSource for CountingTokenSource {
        fn issue(
            &self,
        ) -> Pin<Box<dyn Future<Output = Result<IssuedToken, GatewayError>> + Send + '_>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let token = IssuedToken {
                access_token: Secret::new(format!("token-{n}")),
                expires_in: self.expires_in,
            };
            Box::pin(std::future::ready(Ok(token)))
        }
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;
    use raffle_pay_core::{Raffle, TicketNumber};
    use std::collections::HashSet;

    /// Non-empty ticket requests within `raffle`'s range, duplicates allowed.
    pub fn ticket_requests(raffle: &Raffle) -> impl Strategy<Value = Vec<TicketNumber>> + use<> {
        let range = raffle.initial_ticket..=raffle.last_ticket();
        proptest::collection::vec(range, 1..40)
    }

    /// Sets of taken tickets within `raffle`'s range.
    pub fn taken_tickets(raffle: &Raffle) -> impl Strategy<Value = HashSet<TicketNumber>> + use<> {
        let range = raffle.initial_ticket..=raffle.last_ticket();
        proptest::collection::hash_set(range, 0..200)
    }
}

// Re-export commonly used items
pub use mocks::{CountingTokenSource, FixedAvailability, FixedClock, ManualClock, test_clock};

#[cfg(test)]
mod tests {
    use super::*;
    use raffle_pay_gateway::TokenSource;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::at_test_epoch();
        let handle = clock.clone();

        handle.advance_secs(90);

        assert_eq!((clock.now() - mocks::test_epoch()).num_seconds(), 90);
    }

    #[test]
    fn test_counting_token_source() {
        let source = CountingTokenSource::new(600);

        let first = tokio_test::block_on(source.issue());
        let second = tokio_test::block_on(source.issue());

        assert_eq!(source.calls(), 2);
        assert!(matches!(first, Ok(ref t) if t.access_token.expose() == "token-1"));
        assert!(matches!(second, Ok(ref t) if t.expires_in == 600));
    }
}
