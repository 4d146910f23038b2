//! Simulated draw data for the mock catalog.
//!
//! There is no ticket ledger behind the catalog, so sold-ticket lists, winners,
//! prizes and participant verification are generated on demand. Every function
//! takes the random source as a parameter; pass a seeded `StdRng` for
//! reproducible output.

use crate::types::{Raffle, RaffleId, TicketNumber};
use rand::Rng;
use rand::seq::index;
use serde::{Deserialize, Serialize};

const PRIZE_IMAGES: [&str; 8] = [
    "https://images.unsplash.com/photo-1556740758-90de374c12ad?w=400",
    "https://images.unsplash.com/photo-1579621970563-ebec7560ff3e?w=400",
    "https://images.unsplash.com/photo-1606107557195-0e29a4b5b4aa?w=400",
    "https://images.unsplash.com/photo-1513475382585-d06e58bcb0e0?w=400",
    "https://images.unsplash.com/photo-1607082349566-187342175e2f?w=400",
    "https://images.unsplash.com/photo-1558618666-fcd25c85cd64?w=400",
    "https://images.unsplash.com/photo-1557804506-669a67965ba0?w=400",
    "https://images.unsplash.com/photo-1607083206869-4c7672e72a8a?w=400",
];

const MAIN_PRIZE_IMAGE: &str =
    "https://images.unsplash.com/photo-1607083206869-4c7672e72a8a?w=400";

/// A prize attached to a winning ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prize {
    /// Prize identifier (`prize-` + 8 hex digits)
    pub id: String,
    /// Raffle the prize belongs to
    pub raffle_id: RaffleId,
    /// Image URL
    pub image_url: String,
    /// Display title
    pub title: String,
    /// One-line description
    pub short_description: String,
    /// The ticket that wins this prize
    pub winning_ticket: TicketNumber,
    /// Set when this is the raffle's main prize
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_main_prize: Option<bool>,
}

/// A ticket found for a participant during verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedTicket {
    /// Ticket number
    pub ticket_number: TicketNumber,
    /// Set when the ticket won the main prize
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_main_prize: Option<bool>,
    /// Set when the ticket is a bless number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_bless_number: Option<bool>,
}

/// Tickets bought by one document holder in one raffle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    /// Raffle identifier
    pub raffle_id: RaffleId,
    /// Participant's identity document
    pub document_id: String,
    /// Tickets found
    pub bought_tickets: Vec<VerifiedTicket>,
}

/// Pick `count` distinct ticket numbers from the raffle's range.
fn distinct_tickets<R: Rng + ?Sized>(
    raffle: &Raffle,
    count: usize,
    rng: &mut R,
) -> Vec<TicketNumber> {
    let Ok(range) = usize::try_from(raffle.tickets_total) else {
        return Vec::new();
    };

    index::sample(rng, range, count.min(range))
        .into_iter()
        .filter_map(|offset| TicketNumber::try_from(offset).ok())
        .map(|offset| raffle.initial_ticket + offset)
        .collect()
}

/// Tickets already sold: `min(total_sold, tickets_total)` distinct numbers.
pub fn sold_tickets<R: Rng + ?Sized>(raffle: &Raffle, rng: &mut R) -> Vec<TicketNumber> {
    let count = usize::try_from(raffle.total_sold.max(0)).unwrap_or(0);
    distinct_tickets(raffle, count, rng)
}

/// Between one and three main-prize winning tickets.
pub fn main_winners<R: Rng + ?Sized>(raffle: &Raffle, rng: &mut R) -> Vec<TicketNumber> {
    let count = rng.gen_range(1..=3);
    distinct_tickets(raffle, count, rng)
}

/// Between five and ten bless-number winning tickets.
pub fn bless_winners<R: Rng + ?Sized>(raffle: &Raffle, rng: &mut R) -> Vec<TicketNumber> {
    let count = rng.gen_range(5..=10);
    distinct_tickets(raffle, count, rng)
}

/// The prize for `ticket`, or `None` when the ticket is outside the raffle.
///
/// One in ten tickets carries the main prize.
pub fn prize_for_ticket<R: Rng + ?Sized>(
    raffle: &Raffle,
    ticket: TicketNumber,
    rng: &mut R,
) -> Option<Prize> {
    if !raffle.contains(ticket) {
        return None;
    }

    let is_main = rng.gen_bool(0.1);
    let suffix: u32 = rng.gen_range(0..=u32::MAX);
    let image = usize::try_from(ticket.rem_euclid(8))
        .ok()
        .and_then(|i| PRIZE_IMAGES.get(i))
        .copied()
        .unwrap_or(PRIZE_IMAGES[0]);

    let mut prize = Prize {
        id: format!("prize-{suffix:08X}"),
        raffle_id: raffle.id.clone(),
        image_url: image.to_string(),
        title: format!("{} - Premio", raffle.title),
        short_description: format!("Premio ganador de la rifa {}", raffle.title),
        winning_ticket: ticket,
        is_main_prize: None,
    };

    if is_main {
        prize.is_main_prize = Some(true);
        prize.title = format!("{} - Premio Principal", raffle.title);
        prize.short_description = format!("Premio principal ganador de la rifa {}", raffle.title);
        prize.image_url = MAIN_PRIZE_IMAGE.to_string();
    }

    Some(prize)
}

/// Look up the tickets a document holder bought.
///
/// Returns `None` (no tickets) one time in five. Otherwise one to ten tickets,
/// each a bless number with 5% probability, and with 30% probability one of
/// them flagged as the main prize.
pub fn verify_participant<R: Rng + ?Sized>(
    raffle: &Raffle,
    document_id: &str,
    rng: &mut R,
) -> Option<Verification> {
    if rng.gen_bool(0.2) {
        return None;
    }

    let count = rng.gen_range(1..=10);
    let mut bought_tickets: Vec<VerifiedTicket> = distinct_tickets(raffle, count, rng)
        .into_iter()
        .map(|ticket_number| VerifiedTicket {
            ticket_number,
            is_main_prize: None,
            is_bless_number: rng.gen_bool(0.05).then_some(true),
        })
        .collect();

    if !bought_tickets.is_empty() && rng.gen_bool(0.3) {
        let winner = rng.gen_range(0..bought_tickets.len());
        bought_tickets[winner].is_main_prize = Some(true);
    }

    Some(Verification {
        raffle_id: raffle.id.clone(),
        document_id: document_id.to_string(),
        bought_tickets,
    })
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::catalog::{MockRaffleCatalog, RaffleCatalog};
    use crate::environment::SystemClock;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn raffle(id: &str) -> Raffle {
        MockRaffleCatalog::new(Arc::new(SystemClock))
            .raffle(&RaffleId::from(id))
            .expect("fixture raffle exists")
    }

    #[test]
    fn test_sold_tickets_are_distinct_and_in_range() {
        let raffle = raffle("raffle-002");
        let mut rng = StdRng::seed_from_u64(7);

        let sold = sold_tickets(&raffle, &mut rng);
        let unique: HashSet<_> = sold.iter().copied().collect();

        assert_eq!(sold.len(), 100);
        assert_eq!(unique.len(), 100);
        assert!(sold.iter().all(|t| raffle.contains(*t)));
    }

    #[test]
    fn test_winner_counts() {
        let raffle = raffle("raffle-003");
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..50 {
            let main = main_winners(&raffle, &mut rng);
            assert!((1..=3).contains(&main.len()));

            let bless = bless_winners(&raffle, &mut rng);
            assert!((5..=10).contains(&bless.len()));
            assert!(bless.iter().all(|t| raffle.contains(*t)));
        }
    }

    #[test]
    fn test_prize_out_of_range_is_none() {
        let raffle = raffle("raffle-002");
        let mut rng = StdRng::seed_from_u64(3);

        assert!(prize_for_ticket(&raffle, 1000, &mut rng).is_none());

        let prize = prize_for_ticket(&raffle, 1005, &mut rng);
        assert!(prize.as_ref().is_some_and(|p| p.winning_ticket == 1005
            && p.id.starts_with("prize-")
            && p.id.len() == 14));
    }

    #[test]
    fn test_verification_tickets_in_range() {
        let raffle = raffle("raffle-001");
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..50 {
            if let Some(found) = verify_participant(&raffle, "V12345678", &mut rng) {
                assert!((1..=10).contains(&found.bought_tickets.len()));
                assert!(found.bought_tickets.iter().all(|t| raffle.contains(t.ticket_number)));
                let mains = found
                    .bought_tickets
                    .iter()
                    .filter(|t| t.is_main_prize == Some(true))
                    .count();
                assert!(mains <= 1);
            }
        }
    }
}
