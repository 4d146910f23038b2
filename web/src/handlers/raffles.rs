//! Raffle catalog, reservation and draw endpoints.
//!
//! There is no ticket ledger: sold tickets, winners, prizes and verification
//! results are simulated per request from the raffle's ticket range.

#![allow(clippy::missing_errors_doc)]

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State, rejection::{JsonRejection, QueryRejection}},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use raffle_pay_core::draws::{self, Prize, Verification};
use raffle_pay_core::{
    BookingId, Raffle, RaffleCatalog, RaffleId, ReservationError, ReservationOutcome, TicketNumber,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Message returned with a reservation conflict.
pub const CONFLICT_MESSAGE: &str =
    "Some of the selected tickets are no longer available. Please select different numbers.";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Ticket reservation request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParticipantRequest {
    /// Participant identifier
    pub participant_id: String,
    /// Raffle to reserve in
    pub raffle_id: String,
    /// Participant name
    pub name: String,
    /// Participant email
    pub email: String,
    /// Participant phone
    pub phone: String,
    /// Requested tickets
    pub ticket_number: Vec<TicketNumber>,
}

/// Successful reservation.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    /// Reserved tickets
    pub reserve_tickets: Vec<TicketNumber>,
    /// Booking to pay for
    pub booking_id: BookingId,
}

/// Reservation conflict: some tickets were taken.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictResponse {
    /// Always `CONFLICT`
    pub code: String,
    /// User-facing message
    pub message: String,
    /// Tickets asked for
    pub requested_tickets: Vec<TicketNumber>,
    /// Tickets still available
    pub available_tickets: Vec<TicketNumber>,
    /// Tickets already taken
    pub conflict_tickets: Vec<TicketNumber>,
}

/// Ticket verification request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerifyRequest {
    /// Raffle to look in
    pub raffle_id: String,
    /// Participant's document
    pub document_id: String,
}

/// Query of the prize endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeQuery {
    /// Participant's document
    pub document_id: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

fn find_raffle(catalog: &dyn RaffleCatalog, id: &str) -> Result<Raffle, AppError> {
    let id = RaffleId::from(id);
    catalog
        .raffle(&id)
        .ok_or_else(|| ReservationError::RaffleNotFound(id).into())
}

/// List all raffles.
///
/// `GET /api/v1/raffles`
#[allow(clippy::unused_async)]
pub async fn list_raffles(State(catalog): State<Arc<dyn RaffleCatalog>>) -> Json<Vec<Raffle>> {
    Json(catalog.raffles())
}

/// Tickets sold so far.
///
/// `GET /api/v1/raffles/:id/tickets/sold`
#[allow(clippy::unused_async)]
pub async fn sold_tickets(
    State(catalog): State<Arc<dyn RaffleCatalog>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<TicketNumber>>, AppError> {
    let raffle = find_raffle(catalog.as_ref(), &id)?;
    Ok(Json(draws::sold_tickets(&raffle, &mut rand::thread_rng())))
}

/// Reserve tickets for a participant.
///
/// `POST /api/v1/raffles/participant`
///
/// Responds 200 with the booking, or 409 with the conflicting tickets so the
/// caller can pick others.
#[allow(clippy::unused_async)]
pub async fn reserve_tickets(
    State(state): State<AppState>,
    payload: Result<Json<ParticipantRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;

    if request.name.trim().is_empty() || request.email.trim().is_empty() {
        return Err(AppError::bad_request(
            "Name, email, and at least one ticket number are required",
        ));
    }

    let raffle_id = RaffleId::from(request.raffle_id.as_str());
    let outcome = state
        .reservations
        .reserve(&raffle_id, &request.ticket_number)?;

    let response = match outcome {
        ReservationOutcome::Confirmed {
            tickets,
            booking_id,
        } => {
            tracing::info!(
                participant_id = %request.participant_id,
                booking_id = %booking_id,
                "Participant reserved tickets"
            );
            Json(ReservationResponse {
                reserve_tickets: tickets,
                booking_id,
            })
            .into_response()
        }
        ReservationOutcome::Conflict {
            requested,
            available,
            conflict,
        } => (
            StatusCode::CONFLICT,
            Json(ConflictResponse {
                code: "CONFLICT".to_string(),
                message: CONFLICT_MESSAGE.to_string(),
                requested_tickets: requested,
                available_tickets: available,
                conflict_tickets: conflict,
            }),
        )
            .into_response(),
    };

    Ok(response)
}

/// Look up a participant's tickets by document.
///
/// `POST /api/v1/raffles/verify`
#[allow(clippy::unused_async)]
pub async fn verify_tickets(
    State(catalog): State<Arc<dyn RaffleCatalog>>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<Verification>, AppError> {
    let Json(request) = payload?;

    if request.raffle_id.trim().is_empty() {
        return Err(AppError::bad_request("raffleId is required"));
    }
    if request.document_id.trim().is_empty() {
        return Err(AppError::bad_request("documentId is required"));
    }

    let raffle = find_raffle(catalog.as_ref(), &request.raffle_id)?;

    draws::verify_participant(&raffle, &request.document_id, &mut rand::thread_rng())
        .map(Json)
        .ok_or_else(|| {
            AppError::not_found(format!(
                "No tickets found for document {} in raffle {}",
                request.document_id, request.raffle_id
            ))
        })
}

/// Main prize winners.
///
/// `GET /api/v1/raffles/:id/winners/main`
#[allow(clippy::unused_async)]
pub async fn main_winners(
    State(catalog): State<Arc<dyn RaffleCatalog>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<TicketNumber>>, AppError> {
    let raffle = find_raffle(catalog.as_ref(), &id)?;
    Ok(Json(draws::main_winners(&raffle, &mut rand::thread_rng())))
}

/// Bless number winners.
///
/// `GET /api/v1/raffles/:id/winners/bless`
#[allow(clippy::unused_async)]
pub async fn bless_winners(
    State(catalog): State<Arc<dyn RaffleCatalog>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<TicketNumber>>, AppError> {
    let raffle = find_raffle(catalog.as_ref(), &id)?;
    Ok(Json(draws::bless_winners(&raffle, &mut rand::thread_rng())))
}

/// Prize won by a ticket.
///
/// `GET /api/v1/raffles/:id/prizes/:ticket_id?documentId=`
#[allow(clippy::unused_async)]
pub async fn ticket_prize(
    State(catalog): State<Arc<dyn RaffleCatalog>>,
    Path((id, ticket_id)): Path<(String, String)>,
    query: Result<Query<PrizeQuery>, QueryRejection>,
) -> Result<Json<Prize>, AppError> {
    let Query(query) = query?;
    if query.document_id.as_deref().is_none_or(|d| d.trim().is_empty()) {
        return Err(AppError::bad_request("documentId query parameter is required"));
    }

    let ticket: TicketNumber = ticket_id
        .parse()
        .map_err(|_| AppError::bad_request("ticketId must be a valid number"))?;

    catalog
        .raffle(&RaffleId::from(id.as_str()))
        .and_then(|raffle| draws::prize_for_ticket(&raffle, ticket, &mut rand::thread_rng()))
        .map(Json)
        .ok_or_else(|| {
            AppError::not_found(format!("No prize found for raffle {id} and ticket {ticket}"))
        })
}
