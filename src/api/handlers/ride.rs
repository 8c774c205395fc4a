use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::info;
use crate::api::dtos::requests::CreateRideRequest;
use crate::api::dtos::responses::RideDetailsResponse;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::auth::UserProfile;
use crate::domain::models::ride::{NewRideParams, Ride, RideStatus, SearchFilters};
use crate::domain::models::user::UserRole;
use crate::domain::services::lifecycle;
use crate::error::AppError;
use crate::state::AppState;

pub async fn create_ride(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateRideRequest>,
) -> Result<impl IntoResponse, AppError> {
    if user.role != UserRole::Driver {
        return Err(AppError::Forbidden("Only drivers can offer rides".into()));
    }
    if payload.available_seats < 1 {
        return Err(AppError::Validation("A ride must offer at least one seat".into()));
    }
    if payload.price_per_seat < 0.0 {
        return Err(AppError::Validation("Price per seat must not be negative".into()));
    }

    let ride = state.ride_repo.create(&Ride::new(NewRideParams {
        driver_id: user.id,
        from: payload.from.into(),
        to: payload.to.into(),
        departure_date: payload.departure_date,
        departure_time: payload.departure_time,
        available_seats: payload.available_seats,
        price_per_seat: payload.price_per_seat,
        description: payload.description,
    })).await?;

    info!("Ride created: {}", ride.id);
    Ok((StatusCode::CREATED, Json(ride)))
}

pub async fn search_rides(
    State(state): State<Arc<AppState>>,
    Query(filters): Query<SearchFilters>,
) -> Result<impl IntoResponse, AppError> {
    let rides = state.ride_repo.search(&filters).await?;
    Ok(Json(rides))
}

pub async fn my_rides(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let rides = state.ride_repo.list_by_driver(&user.id).await?;
    Ok(Json(rides))
}

pub async fn get_ride(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(ride_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let ride = state.ride_repo.find_by_id(&ride_id).await?
        .ok_or(AppError::NotFound("Ride not found".into()))?;
    let bookings = state.booking_repo.list_by_ride(&ride_id).await?;

    let participant = lifecycle::is_participant(&ride, &bookings, &user.id);
    let messages = if participant {
        state.message_repo.list_by_ride(&ride_id).await?
    } else {
        Vec::new()
    };
    let live_location = if participant && ride.is_location_sharing_enabled {
        ride.live_location()
    } else {
        None
    };

    let driver = state.profile_repo.find_by_id(&ride.driver_id).await?
        .map(|d| UserProfile {
            id: d.id,
            email: d.email,
            first_name: d.first_name,
            last_name: d.last_name,
            role: d.role,
        });

    let seats_remaining = lifecycle::seats_remaining(&ride, &bookings);

    Ok(Json(RideDetailsResponse {
        from: ride.from_location(),
        to: ride.to_location(),
        ride,
        driver,
        bookings,
        messages,
        live_location,
        seats_remaining,
    }))
}

pub async fn start_ride(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(ride_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let ride = require_ride_owner(&state, &ride_id, &user.id).await?;
    if !lifecycle::can_transition(ride.status, RideStatus::InProgress) {
        return Err(AppError::Conflict("Invalid ride status transition".into()));
    }
    let ride = state.ride_repo
        .transition_status(&ride_id, &[RideStatus::Active, RideStatus::Full], RideStatus::InProgress)
        .await?;
    info!("Ride started: {}", ride.id);
    Ok(Json(ride))
}

pub async fn complete_ride(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(ride_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_ride_owner(&state, &ride_id, &user.id).await?;
    let ride = state.ride_repo.complete(&ride_id).await?;
    info!("Ride completed: {}", ride.id);
    Ok(Json(ride))
}

/// Reverts a started ride to `active`. Bookings are untouched.
pub async fn abort_ride(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(ride_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let ride = require_ride_owner(&state, &ride_id, &user.id).await?;
    if !lifecycle::can_transition(ride.status, RideStatus::Active) {
        return Err(AppError::Conflict("Invalid ride status transition".into()));
    }
    let ride = state.ride_repo
        .transition_status(&ride_id, &[RideStatus::InProgress], RideStatus::Active)
        .await?;
    info!("Ride aborted back to active: {}", ride.id);
    Ok(Json(ride))
}

/// Driver cancellation cascade: voids every confirmed booking and files one
/// pending refund request per settled payment.
pub async fn cancel_ride(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(ride_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let ride = require_ride_owner(&state, &ride_id, &user.id).await?;
    if !lifecycle::can_transition(ride.status, RideStatus::Cancelled) {
        return Err(AppError::Conflict("Ride can no longer be cancelled".into()));
    }

    let ride = state.ride_repo
        .cancel_with_bookings(&ride_id, "Ride cancelled by driver")
        .await?;
    info!("Ride cancelled: {}", ride.id);
    Ok(Json(ride))
}

async fn require_ride_owner(state: &Arc<AppState>, ride_id: &str, user_id: &str) -> Result<Ride, AppError> {
    let ride = state.ride_repo.find_by_id(ride_id).await?
        .ok_or(AppError::NotFound("Ride not found".into()))?;
    if ride.driver_id != user_id {
        return Err(AppError::Forbidden("Only the ride's driver can do this".into()));
    }
    Ok(ride)
}
