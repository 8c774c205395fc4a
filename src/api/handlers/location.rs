use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use crate::api::dtos::requests::{ToggleSharingRequest, UpdateLocationRequest};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::ride::{LiveLocation, RideStatus};
use crate::domain::services::lifecycle;
use crate::error::AppError;
use crate::state::AppState;

/// Overwrites the ride's single live-location slot with a fresh sample.
pub async fn update_location(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(ride_id): Path<String>,
    Json(payload): Json<UpdateLocationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ride = state.ride_repo.find_by_id(&ride_id).await?
        .ok_or(AppError::NotFound("Ride not found".into()))?;

    if ride.driver_id != user.id {
        return Err(AppError::Forbidden("Only the ride's driver can report a location".into()));
    }
    if ride.status != RideStatus::InProgress {
        return Err(AppError::Conflict("Live location can only be updated while the ride is in progress".into()));
    }

    let updated = state.ride_repo.update_live_location(&ride_id, &LiveLocation {
        latitude: payload.latitude,
        longitude: payload.longitude,
        accuracy: payload.accuracy,
        timestamp: Utc::now(),
    }).await?;

    Ok(Json(updated))
}

pub async fn toggle_sharing(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(ride_id): Path<String>,
    Json(payload): Json<ToggleSharingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ride = state.ride_repo.find_by_id(&ride_id).await?
        .ok_or(AppError::NotFound("Ride not found".into()))?;

    if ride.driver_id != user.id {
        return Err(AppError::Forbidden("Only the ride's driver can change location sharing".into()));
    }
    if matches!(ride.status, RideStatus::Completed | RideStatus::Cancelled) {
        return Err(AppError::Conflict("Location sharing cannot be changed on a finished ride".into()));
    }

    let updated = state.ride_repo.set_location_sharing(&ride_id, payload.enabled).await?;
    Ok(Json(updated))
}

/// Participants read the latest sample. A disabled sharing flag refuses the
/// read even when a sample is still cached from before the flip.
pub async fn get_location(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(ride_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let ride = state.ride_repo.find_by_id(&ride_id).await?
        .ok_or(AppError::NotFound("Ride not found".into()))?;
    let bookings = state.booking_repo.list_by_ride(&ride_id).await?;

    if !lifecycle::is_participant(&ride, &bookings, &user.id) {
        return Err(AppError::Forbidden("Not a participant in this ride".into()));
    }
    if !ride.is_location_sharing_enabled {
        return Err(AppError::Forbidden("Location sharing is disabled for this ride".into()));
    }

    let location = ride.live_location()
        .ok_or(AppError::NotFound("No live location reported yet".into()))?;
    Ok(Json(location))
}
