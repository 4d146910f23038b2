//! Router assembly.

use crate::handlers::{health, raffles, sypago};
use crate::middleware::{cors_layer, security_headers_layer};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// Build the application router.
///
/// Health endpoints sit at the root; everything else lives under `/api/v1`.
/// `cors_origins` are the only origins allowed to call the API from a browser.
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    let raffle_routes = Router::new()
        .route("/", get(raffles::list_raffles))
        .route("/participant", post(raffles::reserve_tickets))
        .route("/verify", post(raffles::verify_tickets))
        .route("/:id/tickets/sold", get(raffles::sold_tickets))
        .route("/:id/winners/main", get(raffles::main_winners))
        .route("/:id/winners/bless", get(raffles::bless_winners))
        .route("/:id/prizes/:ticket_id", get(raffles::ticket_prize));

    let sypago_routes = Router::new()
        .route("/banks", get(sypago::list_banks))
        .route("/debit/request-otp", post(sypago::request_otp))
        .route("/debit/transaction-otp", post(sypago::confirm_transaction))
        .route("/debit/transaction/status", get(sypago::transaction_status));

    let api_routes = Router::new()
        .nest("/raffles", raffle_routes)
        .nest("/sypago", sypago_routes);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .layer(security_headers_layer())
        .with_state(state)
}
