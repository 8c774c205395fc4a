use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use crate::api::dtos::requests::SendMessageRequest;
use crate::api::dtos::responses::MarkReadResponse;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::message::Message;
use crate::domain::services::lifecycle;
use crate::error::AppError;
use crate::state::AppState;

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(ride_id): Path<String>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let content = payload.content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("Message content must not be empty".into()));
    }

    let ride = state.ride_repo.find_by_id(&ride_id).await?
        .ok_or(AppError::NotFound("Ride not found".into()))?;
    let bookings = state.booking_repo.list_by_ride(&ride_id).await?;

    if !lifecycle::can_send_message(&ride, &bookings, &user.id) {
        return Err(AppError::Forbidden("Not a participant in this ride".into()));
    }

    let message = state.message_repo
        .create(&Message::new(ride_id, user.id, user.role, content.to_string()))
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn list_messages(
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

    let messages = state.message_repo.list_by_ride(&ride_id).await?;
    Ok(Json(messages))
}

/// Marks every message on the ride not authored by the caller as read.
/// Calling it again is a no-op.
pub async fn mark_messages_read(
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

    let updated = state.message_repo.mark_read(&ride_id, &user.id).await?;
    Ok(Json(MarkReadResponse { updated }))
}
