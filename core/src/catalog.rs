//! Raffle catalog.
//!
//! The catalog is an external collaborator: the payment core only needs a
//! raffle's ticket-number range from it. [`MockRaffleCatalog`] serves the fixed
//! set of raffles used in development and tests.

use crate::environment::Clock;
use crate::types::{Raffle, RaffleId};
use chrono::{DateTime, Duration, Months, Utc};
use std::sync::Arc;

/// Read access to the raffles on sale.
pub trait RaffleCatalog: Send + Sync {
    /// All raffles, in display order.
    fn raffles(&self) -> Vec<Raffle>;

    /// Look up a single raffle.
    fn raffle(&self, id: &RaffleId) -> Option<Raffle> {
        self.raffles().into_iter().find(|raffle| &raffle.id == id)
    }
}

/// Fixed catalog of four raffles whose end dates are relative to the clock.
#[derive(Clone)]
pub struct MockRaffleCatalog {
    clock: Arc<dyn Clock>,
}

impl MockRaffleCatalog {
    /// Create a catalog reading "now" from `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

fn months_ahead(now: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    now.checked_add_months(Months::new(months))
        .unwrap_or_else(|| now + Duration::days(30 * i64::from(months)))
}

impl RaffleCatalog for MockRaffleCatalog {
    fn raffles(&self) -> Vec<Raffle> {
        let now = self.clock.now();

        vec![
            Raffle {
                id: RaffleId::from("raffle-001"),
                title: "iPhone 15 Pro Max".to_string(),
                short_description: "Último modelo de iPhone con 256GB de almacenamiento"
                    .to_string(),
                cover_image_url:
                    "https://images.unsplash.com/photo-1592750475338-74b7b21085ab?w=400"
                        .to_string(),
                price: 25.0,
                currency: "USD".to_string(),
                initial_ticket: 1,
                tickets_total: 1000,
                ends_at: now + Duration::days(15),
                is_main: Some(true),
                total_sold: 100,
            },
            Raffle {
                id: RaffleId::from("raffle-002"),
                title: "PlayStation 5".to_string(),
                short_description: "Consola de videojuegos de última generación".to_string(),
                cover_image_url:
                    "https://images.unsplash.com/photo-1606813907291-d86efa9b94db?w=400"
                        .to_string(),
                price: 15.0,
                currency: "USD".to_string(),
                initial_ticket: 1001,
                tickets_total: 800,
                ends_at: now + Duration::days(22),
                is_main: None,
                total_sold: 100,
            },
            Raffle {
                id: RaffleId::from("raffle-003"),
                title: "MacBook Air M2".to_string(),
                short_description: "Laptop ultradelgada con chip M2 y 512GB SSD".to_string(),
                cover_image_url:
                    "https://images.unsplash.com/photo-1541807084-5c52b6b3adef?w=400"
                        .to_string(),
                price: 30.0,
                currency: "USD".to_string(),
                initial_ticket: 1801,
                tickets_total: 500,
                ends_at: months_ahead(now, 1) + Duration::days(5),
                is_main: None,
                total_sold: 50,
            },
            Raffle {
                id: RaffleId::from("raffle-004"),
                title: "Tesla Model 3".to_string(),
                short_description: "Vehículo eléctrico premium con autopilot".to_string(),
                cover_image_url:
                    "https://images.unsplash.com/photo-1560958089-b8a1929cea89?w=400"
                        .to_string(),
                price: 100.0,
                currency: "USD".to_string(),
                initial_ticket: 2301,
                tickets_total: 2000,
                ends_at: months_ahead(now, 2),
                is_main: None,
                total_sold: 5,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::SystemClock;

    #[test]
    fn test_lookup_by_id() {
        let catalog = MockRaffleCatalog::new(Arc::new(SystemClock));

        let raffle = catalog.raffle(&RaffleId::from("raffle-002"));
        assert!(raffle.as_ref().is_some_and(|r| r.initial_ticket == 1001
            && r.tickets_total == 800));
        assert!(catalog.raffle(&RaffleId::from("raffle-999")).is_none());
    }

    #[test]
    fn test_ranges_do_not_overlap() {
        let catalog = MockRaffleCatalog::new(Arc::new(SystemClock));
        let raffles = catalog.raffles();

        for pair in raffles.windows(2) {
            assert!(pair[0].end_ticket() <= pair[1].initial_ticket);
        }
    }

    #[test]
    fn test_only_first_raffle_is_main() {
        let catalog = MockRaffleCatalog::new(Arc::new(SystemClock));
        let main: Vec<_> = catalog
            .raffles()
            .into_iter()
            .filter(|r| r.is_main == Some(true))
            .collect();

        assert_eq!(main.len(), 1);
        assert_eq!(main[0].id.as_str(), "raffle-001");
    }
}
