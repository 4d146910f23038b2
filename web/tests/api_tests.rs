//! The full router against a mock gateway.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use raffle_pay_core::environment::SystemClock;
use raffle_pay_core::{BookingRegistry, MockRaffleCatalog, RaffleCatalog, ReservationEngine};
use raffle_pay_gateway::{GatewayClient, GatewayConfig, Secret};
use raffle_pay_testing::FixedAvailability;
use raffle_pay_web::{AppState, build_router};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestApp {
    server: MockServer,
    router: Router,
}

async fn app_with(availability: FixedAvailability) -> TestApp {
    let server = MockServer::start().await;
    let config = GatewayConfig::new(
        server.uri(),
        "client-1",
        Secret::new("api-key"),
        "01050000111122223333",
    );

    let clock = Arc::new(SystemClock);
    let catalog: Arc<dyn RaffleCatalog> = Arc::new(MockRaffleCatalog::new(clock.clone()));
    let registry = Arc::new(BookingRegistry::new());
    let gateway = GatewayClient::new(config, clock, registry, Arc::clone(&catalog));
    let reservations = ReservationEngine::new(Arc::clone(&catalog), Arc::new(availability));

    let state = AppState::new(gateway, reservations, catalog);
    let router = build_router(state, &["https://rifas.example".to_string()]);

    TestApp { server, router }
}

async fn app() -> TestApp {
    app_with(FixedAvailability::all_available()).await
}

async fn mount_token(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(times)
        .mount(server)
        .await;
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

async fn post(router: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn transaction_body(booking_id: &str) -> Value {
    json!({
        "booking_id": booking_id,
        "participant_id": "P-1",
        "raffle_id": "raffle-001",
        "tickets": [10, 11],
        "receiver_name": "Ana Pérez",
        "receiver_otp": "654321",
        "receiver_document_type": "V",
        "receiver_document_number": "12345678",
        "receiver_bank_code": "0102",
        "receiver_account_number": "04141234567",
        "amount": 50.0,
        "currency": "VES"
    })
}

// ============================================================================
// Health and headers
// ============================================================================

#[tokio::test]
async fn test_health_carries_security_headers() {
    let app = app().await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "SAMEORIGIN");
    assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
    assert_eq!(headers.get(header::X_XSS_PROTECTION).unwrap(), "1; mode=block");

    let (_, body) = get(&app.router, "/ready").await;
    assert_eq!(body, json!({ "ready": true }));
}

// ============================================================================
// Raffles
// ============================================================================

#[tokio::test]
async fn test_list_raffles() {
    let app = app().await;

    let (status, body) = get(&app.router, "/api/v1/raffles").await;

    assert_eq!(status, StatusCode::OK);
    let raffles = body.as_array().unwrap();
    assert_eq!(raffles.len(), 4);
    assert_eq!(raffles[1]["id"], "raffle-002");
    assert_eq!(raffles[1]["initialTicket"], 1001);
    assert_eq!(raffles[1]["ticketsTotal"], 800);
}

#[tokio::test]
async fn test_sold_tickets_in_range() {
    let app = app().await;

    let (status, body) = get(&app.router, "/api/v1/raffles/raffle-003/tickets/sold").await;

    assert_eq!(status, StatusCode::OK);
    let tickets: Vec<i64> = serde_json::from_value(body).unwrap();
    assert_eq!(tickets.len(), 50);
    assert!(tickets.iter().all(|t| (1801..2301).contains(t)));
}

#[tokio::test]
async fn test_unknown_raffle_is_not_found() {
    let app = app().await;

    let (status, body) = get(&app.router, "/api/v1/raffles/raffle-999/winners/main").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["message"], "No raffle found with ID: raffle-999");
}

#[tokio::test]
async fn test_reserve_confirmed() {
    let app = app().await;

    let (status, body) = post(
        &app.router,
        "/api/v1/raffles/participant",
        &json!({
            "participantId": "P-1",
            "raffleId": "raffle-001",
            "name": "Ana",
            "email": "ana@example.com",
            "phone": "04141234567",
            "ticketNumber": [7, 8, 7]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reserveTickets"], json!([7, 8]));
    assert!(body["bookingId"].as_str().unwrap().starts_with("BK-"));
}

#[tokio::test]
async fn test_reserve_conflict() {
    let app = app_with(FixedAvailability::taken([5, 7])).await;

    let (status, body) = post(
        &app.router,
        "/api/v1/raffles/participant",
        &json!({
            "raffleId": "raffle-001",
            "name": "Ana",
            "email": "ana@example.com",
            "ticketNumber": [5, 6, 7]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
    assert_eq!(
        body["message"],
        "Some of the selected tickets are no longer available. Please select different numbers."
    );
    assert_eq!(body["requestedTickets"], json!([5, 6, 7]));
    assert_eq!(body["availableTickets"], json!([6]));
    assert_eq!(body["conflictTickets"], json!([5, 7]));
}

#[tokio::test]
async fn test_reserve_out_of_range() {
    let app = app().await;

    let (status, body) = post(
        &app.router,
        "/api/v1/raffles/participant",
        &json!({
            "raffleId": "raffle-002",
            "name": "Ana",
            "email": "ana@example.com",
            "ticketNumber": [1000]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_TICKET_RANGE");
    assert_eq!(
        body["message"],
        "Ticket number 1000 is not valid for raffle raffle-002. Valid range: 1001-1800"
    );
}

#[tokio::test]
async fn test_reserve_requires_contact_details() {
    let app = app().await;

    let (status, body) = post(
        &app.router,
        "/api/v1/raffles/participant",
        &json!({ "raffleId": "raffle-001", "ticketNumber": [1] }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Name, email, and at least one ticket number are required"
    );
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/raffles/participant")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_malformed_query_is_bad_request() {
    let app = app().await;

    for uri in [
        "/api/v1/sypago/debit/transaction/status?transaction_id=TX-1&transaction_id=TX-2",
        "/api/v1/raffles/raffle-001/prizes/5?documentId=V-1&documentId=V-2",
    ] {
        let (status, body) = get(&app.router, uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["code"], "BAD_REQUEST", "{uri}");
        assert!(
            body["message"].as_str().unwrap().starts_with("Invalid query"),
            "{uri}: {body}"
        );
    }
}

#[tokio::test]
async fn test_verify_requires_fields() {
    let app = app().await;

    let (status, body) = post(
        &app.router,
        "/api/v1/raffles/verify",
        &json!({ "documentId": "V-1" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "raffleId is required");

    let (status, body) = post(
        &app.router,
        "/api/v1/raffles/verify",
        &json!({ "raffleId": "raffle-001" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "documentId is required");
}

#[tokio::test]
async fn test_prize_lookup_validation() {
    let app = app().await;

    let (status, body) = get(&app.router, "/api/v1/raffles/raffle-001/prizes/5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "documentId query parameter is required");

    let (status, body) = get(
        &app.router,
        "/api/v1/raffles/raffle-001/prizes/abc?documentId=V-1",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "ticketId must be a valid number");

    let (status, body) = get(
        &app.router,
        "/api/v1/raffles/raffle-001/prizes/5000?documentId=V-1",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["message"],
        "No prize found for raffle raffle-001 and ticket 5000"
    );

    let (status, body) = get(
        &app.router,
        "/api/v1/raffles/raffle-001/prizes/5?documentId=V-1",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["winningTicket"], 5);
    assert_eq!(body["raffleId"], "raffle-001");
}

// ============================================================================
// Payments
// ============================================================================

#[tokio::test]
async fn test_invalid_debit_request_never_reaches_gateway() {
    let app = app().await;
    mount_token(&app.server, 0).await;

    let (status, body) = post(
        &app.router,
        "/api/v1/sypago/debit/request-otp",
        &json!({
            "document_letter": "X",
            "document": "26951697",
            "bank_code": "0102",
            "account_number": "04242186302",
            "amount": 5.0,
            "currency": "VES"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid document type: X (valid: V, E, J, G)");
}

#[tokio::test]
async fn test_gateway_unauthorized_is_bad_gateway() {
    let app = app().await;
    mount_token(&app.server, 1).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/request/otp"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&app.server)
        .await;

    let (status, body) = post(
        &app.router,
        "/api/v1/sypago/debit/request-otp",
        &json!({
            "document_letter": "V",
            "document": "26951697",
            "bank_code": "0102",
            "account_number": "04242186302",
            "amount": 5.0,
            "currency": "VES"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "GATEWAY_UNAUTHORIZED");
}

#[tokio::test]
async fn test_confirm_then_poll_awards_bless_number() {
    let app = app().await;
    mount_token(&app.server, 1).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/transaction/otp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transaction_id": "TX-9",
            "operation_secret": "op-secret"
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/transaction/TX-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transaction_id": "TX-9",
            "ref_ibp": "REF-1",
            "status": "ACCP",
            "rejected_code": ""
        })))
        .expect(2)
        .mount(&app.server)
        .await;

    let (status, body) = post(
        &app.router,
        "/api/v1/sypago/debit/transaction-otp",
        &transaction_body("BK-WEB"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transaction_id"], "TX-9");
    assert!(!body.to_string().contains("op-secret"));

    let (status, body) = get(
        &app.router,
        "/api/v1/sypago/debit/transaction/status?transaction_id=TX-9&booking_id=BK-WEB&operation_secret=op-secret",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ACCP");
    assert_eq!(body["booking_id"], "BK-WEB");
    assert_eq!(body["bless_numbers"], json!([334]));

    // Later polls recover the booking from the transaction.
    let (_, body) = get(
        &app.router,
        "/api/v1/sypago/debit/transaction/status?transaction_id=TX-9",
    )
    .await;
    assert_eq!(body["booking_id"], "BK-WEB");
    assert_eq!(body["bless_numbers"], json!([334]));
}

#[tokio::test]
async fn test_status_requires_transaction_id() {
    let app = app().await;

    let (status, body) = get(&app.router, "/api/v1/sypago/debit/transaction/status").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "transaction_id is required");
}

#[tokio::test]
async fn test_unknown_transaction_is_not_found() {
    let app = app().await;
    mount_token(&app.server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/transaction/TX-404"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&app.server)
        .await;

    let (status, _) = get(
        &app.router,
        "/api/v1/sypago/debit/transaction/status?transaction_id=TX-404",
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let app = app().await;
    mount_token(&app.server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/banks"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&app.server)
        .await;

    let (status, body) = get(&app.router, "/api/v1/sypago/banks").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "BAD_GATEWAY");
    assert!(!body["message"].as_str().unwrap().contains("maintenance"));
}
