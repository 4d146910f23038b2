//! Booking registry.
//!
//! Keeps the two associations that let independently invoked endpoints recover
//! context:
//!
//! - **booking → raffle**, recorded when a transaction confirmation is issued
//!   and read when an accepted transaction needs its bonus ticket
//! - **transaction → booking**, recorded the first time a status poll supplies a
//!   usable booking id and read when later polls omit it
//!
//! Each map sits behind its own `RwLock`, and no lock is held across an await
//! point outside this module. Writes to the same key are last-writer-wins.
//!
//! By default entries live for the lifetime of the process. A registry built
//! with [`BookingRegistry::with_ttl`] hides entries older than the TTL and drops
//! them on [`BookingRegistry::purge_expired`].

use crate::environment::{Clock, SystemClock};
use crate::types::{BookingId, RaffleId, TransactionId};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    recorded_at: DateTime<Utc>,
}

type Map<K, V> = RwLock<HashMap<K, Entry<V>>>;

/// In-memory booking associations.
pub struct BookingRegistry {
    booking_raffles: Map<BookingId, RaffleId>,
    transaction_bookings: Map<TransactionId, BookingId>,
    clock: Arc<dyn Clock>,
    ttl: Option<Duration>,
}

impl Default for BookingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingRegistry {
    /// Create a registry that never evicts.
    #[must_use]
    pub fn new() -> Self {
        Self {
            booking_raffles: RwLock::new(HashMap::new()),
            transaction_bookings: RwLock::new(HashMap::new()),
            clock: Arc::new(SystemClock),
            ttl: None,
        }
    }

    /// Create a registry whose entries expire `ttl` after they were written.
    #[must_use]
    pub fn with_ttl(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            booking_raffles: RwLock::new(HashMap::new()),
            transaction_bookings: RwLock::new(HashMap::new()),
            clock,
            ttl: Some(ttl),
        }
    }

    fn is_live<V>(&self, entry: &Entry<V>, now: DateTime<Utc>) -> bool {
        self.ttl.is_none_or(|ttl| now - entry.recorded_at < ttl)
    }

    async fn save<K: Eq + Hash, V>(&self, map: &Map<K, V>, key: K, value: V) {
        let entry = Entry {
            value,
            recorded_at: self.clock.now(),
        };
        map.write().await.insert(key, entry);
    }

    async fn lookup<K: Eq + Hash, V: Clone>(&self, map: &Map<K, V>, key: &K) -> Option<V> {
        let now = self.clock.now();
        let guard = map.read().await;
        guard
            .get(key)
            .filter(|entry| self.is_live(entry, now))
            .map(|entry| entry.value.clone())
    }

    /// Associate a booking with its raffle, replacing any earlier association.
    pub async fn save_booking_raffle(&self, booking_id: BookingId, raffle_id: RaffleId) {
        tracing::debug!(booking_id = %booking_id, raffle_id = %raffle_id, "Recorded booking raffle");
        self.save(&self.booking_raffles, booking_id, raffle_id).await;
    }

    /// The raffle a booking belongs to, if known.
    pub async fn lookup_raffle_by_booking(&self, booking_id: &BookingId) -> Option<RaffleId> {
        self.lookup(&self.booking_raffles, booking_id).await
    }

    /// Associate a gateway transaction with a booking, replacing any earlier association.
    pub async fn save_transaction_booking(
        &self,
        transaction_id: TransactionId,
        booking_id: BookingId,
    ) {
        tracing::debug!(
            transaction_id = %transaction_id,
            booking_id = %booking_id,
            "Recorded transaction booking"
        );
        self.save(&self.transaction_bookings, transaction_id, booking_id)
            .await;
    }

    /// The booking a transaction was polled under, if known.
    pub async fn lookup_booking_by_transaction(
        &self,
        transaction_id: &TransactionId,
    ) -> Option<BookingId> {
        self.lookup(&self.transaction_bookings, transaction_id).await
    }

    /// Remove expired entries from both maps and return how many were dropped.
    ///
    /// Always zero for a registry without a TTL.
    pub async fn purge_expired(&self) -> usize {
        if self.ttl.is_none() {
            return 0;
        }

        let now = self.clock.now();
        let mut removed = 0;

        {
            let mut bookings = self.booking_raffles.write().await;
            let before = bookings.len();
            bookings.retain(|_, entry| self.is_live(entry, now));
            removed += before - bookings.len();
        }

        {
            let mut transactions = self.transaction_bookings.write().await;
            let before = transactions.len();
            transactions.retain(|_, entry| self.is_live(entry, now));
            removed += before - transactions.len();
        }

        if removed > 0 {
            tracing::debug!(removed, "Purged expired registry entries");
        }

        removed
    }

    /// Number of live entries as `(bookings, transactions)`.
    pub async fn len(&self) -> (usize, usize) {
        let now = self.clock.now();
        let bookings = self
            .booking_raffles
            .read()
            .await
            .values()
            .filter(|entry| self.is_live(entry, now))
            .count();
        let transactions = self
            .transaction_bookings
            .read()
            .await
            .values()
            .filter(|entry| self.is_live(entry, now))
            .count();
        (bookings, transactions)
    }
}
