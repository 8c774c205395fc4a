use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{auth, booking, health, location, message, payment, profile, ride};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))

        // Profile
        .route("/api/v1/profile", get(profile::get_profile).put(profile::update_profile))

        // Rides
        .route("/api/v1/rides", post(ride::create_ride).get(ride::search_rides))
        .route("/api/v1/rides/mine", get(ride::my_rides))
        .route("/api/v1/rides/{ride_id}", get(ride::get_ride))

        // Ride lifecycle
        .route("/api/v1/rides/{ride_id}/start", post(ride::start_ride))
        .route("/api/v1/rides/{ride_id}/complete", post(ride::complete_ride))
        .route("/api/v1/rides/{ride_id}/abort", post(ride::abort_ride))
        .route("/api/v1/rides/{ride_id}/cancel", post(ride::cancel_ride))

        // Bookings
        .route("/api/v1/rides/{ride_id}/bookings", post(booking::create_booking))
        .route("/api/v1/bookings/mine", get(booking::my_bookings))
        .route("/api/v1/bookings/{booking_id}/cancel", post(booking::cancel_booking))

        // Messaging
        .route("/api/v1/rides/{ride_id}/messages", post(message::send_message).get(message::list_messages))
        .route("/api/v1/rides/{ride_id}/messages/read", post(message::mark_messages_read))

        // Live location
        .route("/api/v1/rides/{ride_id}/location", put(location::update_location).get(location::get_location))
        .route("/api/v1/rides/{ride_id}/location/sharing", post(location::toggle_sharing))

        // Payments
        .route("/api/v1/payments", get(payment::payment_history))
        .route("/api/v1/payments/{payment_id}/refund", post(payment::request_refund))
        .route("/api/v1/payment-methods", post(payment::create_payment_method).get(payment::list_payment_methods))
        .route("/api/v1/refunds", get(payment::list_refunds))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
