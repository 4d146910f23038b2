//! # Raffle Pay Server
//!
//! Wires configuration, the in-memory domain services and the HTTP router
//! into a runnable application. The `server` binary is a thin wrapper over
//! [`build_services`] and [`build_app`].

pub mod config;

use axum::{Router, routing::get};
use metrics::describe_counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use raffle_pay_core::environment::Clock;
use raffle_pay_core::reservation::RandomAvailability;
use raffle_pay_core::{BookingRegistry, MockRaffleCatalog, RaffleCatalog, ReservationEngine};
use raffle_pay_gateway::GatewayClient;
use raffle_pay_web::{AppState, build_router};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub use config::{Config, ConfigError};

/// Domain services built from configuration.
#[derive(Clone)]
pub struct Services {
    /// State shared by the HTTP handlers
    pub state: AppState,
    /// The registry inside the gateway client, kept for the sweeper
    pub registry: Arc<BookingRegistry>,
}

/// Build every in-memory service the handlers need.
#[must_use]
pub fn build_services(config: &Config, clock: Arc<dyn Clock>) -> Services {
    let catalog: Arc<dyn RaffleCatalog> = Arc::new(MockRaffleCatalog::new(Arc::clone(&clock)));

    let registry = Arc::new(match config.registry.ttl_secs {
        Some(ttl) => BookingRegistry::with_ttl(Arc::clone(&clock), chrono::Duration::seconds(ttl)),
        None => BookingRegistry::new(),
    });

    let availability = Arc::new(RandomAvailability::new(
        config.reservation.ticket_availability,
    ));
    let reservations = ReservationEngine::new(Arc::clone(&catalog), availability);

    let gateway = GatewayClient::new(
        config.gateway.clone(),
        clock,
        Arc::clone(&registry),
        Arc::clone(&catalog),
    );

    Services {
        state: AppState::new(gateway, reservations, catalog),
        registry,
    }
}

/// The application router, plus `GET /metrics` when a Prometheus handle is given.
pub fn build_app(config: &Config, services: &Services, metrics: Option<PrometheusHandle>) -> Router {
    let app = build_router(services.state.clone(), &config.server.cors_allowed_origins);

    match metrics {
        Some(handle) => app.merge(Router::new().route(
            "/metrics",
            get(move || std::future::ready(handle.render())),
        )),
        None => app,
    }
}

/// Install the global Prometheus recorder and describe the application's metrics.
///
/// # Errors
///
/// Fails if a recorder is already installed.
pub fn install_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();
    Ok(handle)
}

fn register_metrics() {
    describe_counter!(
        "gateway_requests_total",
        "Gateway calls by operation and outcome"
    );
    describe_counter!(
        "gateway_token_refresh_total",
        "Bearer tokens obtained from the gateway"
    );
    describe_counter!(
        "reservations_total",
        "Ticket reservation attempts by outcome"
    );
}

/// Periodically purge expired registry entries.
///
/// The task runs until aborted.
pub fn spawn_registry_sweeper(registry: Arc<BookingRegistry>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let removed = registry.purge_expired().await;
            if removed > 0 {
                tracing::info!(removed, "Registry sweep completed");
            }
        }
    })
}
