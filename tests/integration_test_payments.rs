mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{AuthHeaders, TestApp};
use serde_json::{json, Value};
use shareride_backend::background::settle_pending_refunds;
use tower::ServiceExt;

async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn add_method(app: &TestApp, auth: &AuthHeaders, payload: Value) -> Value {
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/payment-methods")
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    parse_body(res).await
}

async fn booked_payment(app: &TestApp) -> (AuthHeaders, String) {
    let (driver, _) = app.register("driver@test.com", "driver").await;
    let (passenger, _) = app.register("p1@test.com", "passenger").await;

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/rides")
            .header(header::COOKIE, format!("access_token={}", driver.access_token))
            .header("X-CSRF-Token", &driver.csrf_token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({
                "from": {"address": "1 A St", "city": "Berlin", "country": "DE"},
                "to": {"address": "2 B St", "city": "Hamburg", "country": "DE"},
                "departure_date": "2030-06-01",
                "departure_time": "08:30",
                "available_seats": 3,
                "price_per_seat": 20.0
            }).to_string())).unwrap()
    ).await.unwrap();
    let ride_id = parse_body(res).await["id"].as_str().unwrap().to_string();

    let method = add_method(app, &passenger, json!({
        "kind": "card", "last4": "4242", "brand": "visa",
        "expiry_month": 12, "expiry_year": 2099, "is_default": true
    })).await;

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/rides/{}/bookings", ride_id))
            .header(header::COOKIE, format!("access_token={}", passenger.access_token))
            .header("X-CSRF-Token", &passenger.csrf_token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({
                "seats": 2,
                "payment_method_id": method["id"]
            }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let payment_id = parse_body(res).await["payment"]["id"].as_str().unwrap().to_string();

    (passenger, payment_id)
}

#[tokio::test]
async fn test_new_default_method_demotes_previous() {
    let app = TestApp::new().await;
    let (user, _) = app.register("payer@test.com", "passenger").await;

    add_method(&app, &user, json!({
        "kind": "card", "last4": "1111", "brand": "visa",
        "expiry_month": 1, "expiry_year": 2099, "is_default": true
    })).await;
    add_method(&app, &user, json!({"kind": "wallet", "is_default": true})).await;

    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri("/api/v1/payment-methods")
            .header(header::COOKIE, format!("access_token={}", user.access_token))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    let methods = parse_body(res).await;
    assert_eq!(methods.as_array().unwrap().len(), 2);
    assert_eq!(methods[0]["kind"], "card");
    assert_eq!(methods[0]["is_default"], false);
    assert_eq!(methods[1]["kind"], "wallet");
    assert_eq!(methods[1]["is_default"], true);
}

#[tokio::test]
async fn test_payment_history_lists_settled_charge() {
    let app = TestApp::new().await;
    let (passenger, payment_id) = booked_payment(&app).await;

    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri("/api/v1/payments")
            .header(header::COOKIE, format!("access_token={}", passenger.access_token))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let payments = parse_body(res).await;
    assert_eq!(payments.as_array().unwrap().len(), 1);
    assert_eq!(payments[0]["id"], payment_id.as_str());
    assert_eq!(payments[0]["status"], "completed");
    assert_eq!(payments[0]["amount"], 40.0);
    assert_eq!(payments[0]["currency"], "USD");
}

#[tokio::test]
async fn test_manual_refund_settles_through_worker() {
    let app = TestApp::new().await;
    let (passenger, payment_id) = booked_payment(&app).await;

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/payments/{}/refund", payment_id))
            .header(header::COOKIE, format!("access_token={}", passenger.access_token))
            .header("X-CSRF-Token", &passenger.csrf_token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"reason": "Changed my plans"}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let refund = parse_body(res).await;
    assert_eq!(refund["status"], "pending");
    assert_eq!(refund["reason"], "Changed my plans");
    assert!(refund["processed_at"].is_null());

    settle_pending_refunds(&app.state).await;

    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri("/api/v1/refunds")
            .header(header::COOKIE, format!("access_token={}", passenger.access_token))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    let refunds = parse_body(res).await;
    assert_eq!(refunds[0]["status"], "completed");
    assert!(!refunds[0]["processed_at"].is_null());

    // The payment itself is now refunded.
    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri("/api/v1/payments")
            .header(header::COOKIE, format!("access_token={}", passenger.access_token))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    let payments = parse_body(res).await;
    assert_eq!(payments[0]["status"], "refunded");
}

#[tokio::test]
async fn test_refund_requires_completed_payment_and_ownership() {
    let app = TestApp::new().await;
    let (passenger, payment_id) = booked_payment(&app).await;
    let (other, _) = app.register("other@test.com", "passenger").await;

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/payments/{}/refund", payment_id))
            .header(header::COOKIE, format!("access_token={}", other.access_token))
            .header("X-CSRF-Token", &other.csrf_token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Refund it once, settle, then a second request must conflict.
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/payments/{}/refund", payment_id))
            .header(header::COOKIE, format!("access_token={}", passenger.access_token))
            .header("X-CSRF-Token", &passenger.csrf_token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    settle_pending_refunds(&app.state).await;

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/payments/{}/refund", payment_id))
            .header(header::COOKIE, format!("access_token={}", passenger.access_token))
            .header("X-CSRF-Token", &passenger.csrf_token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}
