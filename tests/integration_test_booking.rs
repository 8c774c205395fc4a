mod common;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{AuthHeaders, TestApp};
use serde_json::{json, Value};
use shareride_backend::domain::models::payment::PaymentMethod;
use shareride_backend::domain::ports::{GatewayCharge, PaymentGateway};
use shareride_backend::error::AppError;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

/// Gateway double with a configurable settle delay that records refund calls.
struct SettlingGateway {
    settle_ms: u64,
    refunds: Mutex<Vec<(String, f64)>>,
}

#[async_trait]
impl PaymentGateway for SettlingGateway {
    async fn charge(&self, _amount: f64, _currency: &str, _method: &PaymentMethod) -> Result<GatewayCharge, AppError> {
        tokio::time::sleep(Duration::from_millis(self.settle_ms)).await;
        Ok(GatewayCharge { reference: format!("chg_{}", Uuid::new_v4()) })
    }

    async fn refund(&self, gateway_reference: &str, amount: f64) -> Result<(), AppError> {
        self.refunds.lock().unwrap().push((gateway_reference.to_string(), amount));
        Ok(())
    }
}

async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_ride(app: &TestApp, auth: &AuthHeaders, seats: i32) -> String {
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/rides")
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({
                "from": {"address": "1 A St", "city": "Berlin", "country": "DE"},
                "to": {"address": "2 B St", "city": "Hamburg", "country": "DE"},
                "departure_date": "2030-06-01",
                "departure_time": "08:30",
                "available_seats": seats,
                "price_per_seat": 20.0
            }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    parse_body(res).await["id"].as_str().unwrap().to_string()
}

async fn add_card(app: &TestApp, auth: &AuthHeaders, expiry_year: i32) -> String {
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/payment-methods")
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({
                "kind": "card",
                "last4": "4242",
                "brand": "visa",
                "expiry_month": 12,
                "expiry_year": expiry_year,
                "is_default": true
            }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    parse_body(res).await["id"].as_str().unwrap().to_string()
}

async fn book(app: &TestApp, auth: &AuthHeaders, ride_id: &str, seats: i32, method_id: &str) -> axum::response::Response {
    app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/rides/{}/bookings", ride_id))
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({
                "seats": seats,
                "payment_method_id": method_id
            }).to_string())).unwrap()
    ).await.unwrap()
}

async fn ride_status(app: &TestApp, auth: &AuthHeaders, ride_id: &str) -> String {
    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri(format!("/api/v1/rides/{}", ride_id))
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    parse_body(res).await["ride"]["status"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_booking_settles_payment_and_fixes_total_price() {
    let app = TestApp::new().await;
    let (driver, _) = app.register("driver@test.com", "driver").await;
    let (passenger, passenger_id) = app.register("p1@test.com", "passenger").await;
    let ride_id = create_ride(&app, &driver, 3).await;
    let card = add_card(&app, &passenger, 2099).await;

    let res = book(&app, &passenger, &ride_id, 2, &card).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = parse_body(res).await;

    assert_eq!(body["booking"]["seats_booked"], 2);
    assert_eq!(body["booking"]["total_price"], 40.0);
    assert_eq!(body["booking"]["status"], "confirmed");
    assert_eq!(body["booking"]["passenger_id"], passenger_id.as_str());
    assert_eq!(body["payment"]["status"], "completed");
    assert_eq!(body["payment"]["amount"], 40.0);
    assert!(body["payment"]["gateway_reference"].as_str().unwrap().starts_with("sim_"));
}

#[tokio::test]
async fn test_ride_becomes_full_exactly_at_capacity() {
    let app = TestApp::new().await;
    let (driver, _) = app.register("driver@test.com", "driver").await;
    let (p1, _) = app.register("p1@test.com", "passenger").await;
    let (p2, _) = app.register("p2@test.com", "passenger").await;
    let ride_id = create_ride(&app, &driver, 3).await;
    let c1 = add_card(&app, &p1, 2099).await;
    let c2 = add_card(&app, &p2, 2099).await;

    assert_eq!(book(&app, &p1, &ride_id, 2, &c1).await.status(), StatusCode::CREATED);
    assert_eq!(ride_status(&app, &p1, &ride_id).await, "active");

    assert_eq!(book(&app, &p2, &ride_id, 1, &c2).await.status(), StatusCode::CREATED);
    assert_eq!(ride_status(&app, &p1, &ride_id).await, "full");

    // Full ride refuses further bookings.
    let (p3, _) = app.register("p3@test.com", "passenger").await;
    let c3 = add_card(&app, &p3, 2099).await;
    assert_eq!(book(&app, &p3, &ride_id, 1, &c3).await.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_overbooking_is_rejected() {
    let app = TestApp::new().await;
    let (driver, _) = app.register("driver@test.com", "driver").await;
    let (p1, _) = app.register("p1@test.com", "passenger").await;
    let (p2, _) = app.register("p2@test.com", "passenger").await;
    let ride_id = create_ride(&app, &driver, 3).await;
    let c1 = add_card(&app, &p1, 2099).await;
    let c2 = add_card(&app, &p2, 2099).await;

    assert_eq!(book(&app, &p1, &ride_id, 2, &c1).await.status(), StatusCode::CREATED);
    assert_eq!(book(&app, &p2, &ride_id, 2, &c2).await.status(), StatusCode::CONFLICT);

    // The remaining single seat is still bookable.
    assert_eq!(book(&app, &p2, &ride_id, 1, &c2).await.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_zero_seats_is_a_validation_error() {
    let app = TestApp::new().await;
    let (driver, _) = app.register("driver@test.com", "driver").await;
    let (p1, _) = app.register("p1@test.com", "passenger").await;
    let ride_id = create_ride(&app, &driver, 3).await;
    let card = add_card(&app, &p1, 2099).await;

    assert_eq!(book(&app, &p1, &ride_id, 0, &card).await.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_driver_cannot_book_own_ride() {
    let app = TestApp::new().await;
    let (driver, _) = app.register("driver@test.com", "driver").await;
    let ride_id = create_ride(&app, &driver, 3).await;
    let card = add_card(&app, &driver, 2099).await;

    assert_eq!(book(&app, &driver, &ride_id, 1, &card).await.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_expired_card_fails_payment_and_leaves_no_booking() {
    let app = TestApp::new().await;
    let (driver, _) = app.register("driver@test.com", "driver").await;
    let (p1, _) = app.register("p1@test.com", "passenger").await;
    let ride_id = create_ride(&app, &driver, 3).await;
    let expired = add_card(&app, &p1, 2020).await;

    let res = book(&app, &p1, &ride_id, 1, &expired).await;
    assert_eq!(res.status(), StatusCode::PAYMENT_REQUIRED);

    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri("/api/v1/bookings/mine")
            .header(header::COOKIE, format!("access_token={}", p1.access_token))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    let bookings = parse_body(res).await;
    assert_eq!(bookings.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_cancel_booking_reverts_full_ride_and_files_refund() {
    let app = TestApp::new().await;
    let (driver, _) = app.register("driver@test.com", "driver").await;
    let (p1, _) = app.register("p1@test.com", "passenger").await;
    let (p2, _) = app.register("p2@test.com", "passenger").await;
    let ride_id = create_ride(&app, &driver, 3).await;
    let c1 = add_card(&app, &p1, 2099).await;
    let c2 = add_card(&app, &p2, 2099).await;

    let res = book(&app, &p1, &ride_id, 2, &c1).await;
    let booking_id = parse_body(res).await["booking"]["id"].as_str().unwrap().to_string();
    book(&app, &p2, &ride_id, 1, &c2).await;
    assert_eq!(ride_status(&app, &p1, &ride_id).await, "full");

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/bookings/{}/cancel", booking_id))
            .header(header::COOKIE, format!("access_token={}", p1.access_token))
            .header("X-CSRF-Token", &p1.csrf_token)
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["status"], "cancelled");

    // Freed seats flip the ride back to active.
    assert_eq!(ride_status(&app, &p1, &ride_id).await, "active");

    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri("/api/v1/refunds")
            .header(header::COOKIE, format!("access_token={}", p1.access_token))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    let refunds = parse_body(res).await;
    assert_eq!(refunds.as_array().unwrap().len(), 1);
    assert_eq!(refunds[0]["amount"], 40.0);
    assert_eq!(refunds[0]["status"], "pending");
}

#[tokio::test]
async fn test_cancel_booking_twice_conflicts() {
    let app = TestApp::new().await;
    let (driver, _) = app.register("driver@test.com", "driver").await;
    let (p1, _) = app.register("p1@test.com", "passenger").await;
    let ride_id = create_ride(&app, &driver, 3).await;
    let card = add_card(&app, &p1, 2099).await;

    let res = book(&app, &p1, &ride_id, 1, &card).await;
    let booking_id = parse_body(res).await["booking"]["id"].as_str().unwrap().to_string();

    for expected in [StatusCode::OK, StatusCode::CONFLICT] {
        let res = app.router.clone().oneshot(
            Request::builder().method("POST").uri(format!("/api/v1/bookings/{}/cancel", booking_id))
                .header(header::COOKIE, format!("access_token={}", p1.access_token))
                .header("X-CSRF-Token", &p1.csrf_token)
                .body(Body::empty()).unwrap()
        ).await.unwrap();
        assert_eq!(res.status(), expected);
    }
}

#[tokio::test]
async fn test_only_owner_can_cancel_booking() {
    let app = TestApp::new().await;
    let (driver, _) = app.register("driver@test.com", "driver").await;
    let (p1, _) = app.register("p1@test.com", "passenger").await;
    let (p2, _) = app.register("p2@test.com", "passenger").await;
    let ride_id = create_ride(&app, &driver, 3).await;
    let card = add_card(&app, &p1, 2099).await;

    let res = book(&app, &p1, &ride_id, 1, &card).await;
    let booking_id = parse_body(res).await["booking"]["id"].as_str().unwrap().to_string();

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/bookings/{}/cancel", booking_id))
            .header(header::COOKIE, format!("access_token={}", p2.access_token))
            .header("X-CSRF-Token", &p2.csrf_token)
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_racing_bookings_one_wins_and_loser_is_refunded() {
    let gateway = Arc::new(SettlingGateway { settle_ms: 100, refunds: Mutex::new(Vec::new()) });
    let app = TestApp::with_gateway(gateway.clone()).await;
    let (driver, _) = app.register("driver@test.com", "driver").await;
    let (p1, _) = app.register("p1@test.com", "passenger").await;
    let (p2, _) = app.register("p2@test.com", "passenger").await;
    let ride_id = create_ride(&app, &driver, 1).await;
    let c1 = add_card(&app, &p1, 2099).await;
    let c2 = add_card(&app, &p2, 2099).await;

    // Both requests pass the handler pre-check while the charges are still
    // settling; the transaction's seat re-check decides the winner.
    let (res1, res2) = tokio::join!(
        book(&app, &p1, &ride_id, 1, &c1),
        book(&app, &p2, &ride_id, 1, &c2),
    );
    let mut statuses = [res1.status(), res2.status()];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);

    // Only the winner's booking exists.
    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri(format!("/api/v1/rides/{}", ride_id))
            .header(header::COOKIE, format!("access_token={}", driver.access_token))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    let detail = parse_body(res).await;
    assert_eq!(detail["bookings"].as_array().unwrap().len(), 1);
    assert_eq!(detail["ride"]["status"], "full");

    // The loser's settled charge was sent back in full.
    let refunds = gateway.refunds.lock().unwrap();
    assert_eq!(refunds.len(), 1);
    assert_eq!(refunds[0].1, 20.0);
}

#[tokio::test]
async fn test_unknown_payment_method_is_not_found() {
    let app = TestApp::new().await;
    let (driver, _) = app.register("driver@test.com", "driver").await;
    let (p1, _) = app.register("p1@test.com", "passenger").await;
    let ride_id = create_ride(&app, &driver, 3).await;

    assert_eq!(book(&app, &p1, &ride_id, 1, "no-such-method").await.status(), StatusCode::NOT_FOUND);
}
