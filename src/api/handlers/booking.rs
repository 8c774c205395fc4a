use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{error, info};
use crate::api::dtos::requests::BookRideRequest;
use crate::api::dtos::responses::BookingCreatedResponse;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::booking::Booking;
use crate::domain::models::payment::{NewPaymentParams, Payment, RefundRequest};
use crate::domain::services::lifecycle;
use crate::error::AppError;
use crate::state::AppState;

/// Books seats on a ride. The gateway is charged first; only a settled charge
/// produces the booking row, and the repository re-checks capacity inside its
/// transaction so two racing passengers cannot both squeeze in.
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(ride_id): Path<String>,
    Json(payload): Json<BookRideRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ride = state.ride_repo.find_by_id(&ride_id).await?
        .ok_or(AppError::NotFound("Ride not found".into()))?;

    if ride.driver_id == user.id {
        return Err(AppError::Forbidden("Drivers cannot book their own ride".into()));
    }

    let bookings = state.booking_repo.list_by_ride(&ride_id).await?;
    lifecycle::validate_booking(&ride, &bookings, payload.seats)?;

    let method = state.payment_repo.find_method(&user.id, &payload.payment_method_id).await?
        .ok_or(AppError::NotFound("Payment method not found".into()))?;

    let booking = Booking::new(ride_id.clone(), user.id.clone(), payload.seats, ride.price_per_seat);

    let charge = state.payment_gateway
        .charge(booking.total_price, &state.config.currency, &method)
        .await?;

    let payment = Payment::completed(NewPaymentParams {
        booking_id: booking.id.clone(),
        ride_id: ride_id.clone(),
        payer_id: user.id.clone(),
        amount: booking.total_price,
        currency: state.config.currency.clone(),
        payment_method_id: method.id,
        gateway_reference: charge.reference,
    });

    let created = match state.booking_repo.create_with_payment(&booking, &payment).await {
        Ok(created) => created,
        Err(err) => {
            // The charge settled but nothing was persisted (lost the seat
            // re-check, ride flipped, or a DB failure). Send the money back.
            if let Err(refund_err) = state.payment_gateway
                .refund(&payment.gateway_reference, booking.total_price)
                .await
            {
                error!(
                    "Compensating refund failed for charge {}: {}",
                    payment.gateway_reference, refund_err
                );
            }
            return Err(err);
        }
    };

    info!("Booking created: {} on ride {}", created.id, ride_id);
    Ok((StatusCode::CREATED, Json(BookingCreatedResponse {
        booking: created,
        payment,
    })))
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_repo.find_by_id(&booking_id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;

    if booking.passenger_id != user.id {
        return Err(AppError::Forbidden("Only the booking's passenger can cancel it".into()));
    }

    let refund = match state.payment_repo.find_completed_by_booking(&booking.id).await? {
        Some(payment) => Some(RefundRequest::new(
            payment.id,
            payment.amount,
            "Booking cancelled by passenger".to_string(),
        )),
        None => None,
    };

    let cancelled = state.booking_repo.cancel(&booking, refund.as_ref()).await?;

    info!("Booking cancelled: {}", cancelled.id);
    Ok(Json(cancelled))
}

pub async fn my_bookings(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_repo.list_by_passenger(&user.id).await?;
    Ok(Json(bookings))
}
