//! Application state shared across HTTP handlers.

use axum::extract::FromRef;
use raffle_pay_core::{RaffleCatalog, ReservationEngine};
use raffle_pay_gateway::GatewayClient;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cheap to clone: every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Debit-OTP gateway client
    pub gateway: Arc<GatewayClient>,
    /// Ticket reservation engine
    pub reservations: Arc<ReservationEngine>,
    /// Raffle catalog
    pub catalog: Arc<dyn RaffleCatalog>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        gateway: GatewayClient,
        reservations: ReservationEngine,
        catalog: Arc<dyn RaffleCatalog>,
    ) -> Self {
        Self {
            gateway: Arc::new(gateway),
            reservations: Arc::new(reservations),
            catalog,
        }
    }
}

impl FromRef<AppState> for Arc<GatewayClient> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.gateway)
    }
}

impl FromRef<AppState> for Arc<dyn RaffleCatalog> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.catalog)
    }
}
