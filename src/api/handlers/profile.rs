use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use crate::api::dtos::requests::UpdateProfileRequest;
use crate::api::extractors::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.profile_repo.find_by_id(&user.id).await?
        .ok_or(AppError::NotFound("Profile not found".into()))?;
    Ok(Json(profile))
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut profile = state.profile_repo.find_by_id(&user.id).await?
        .ok_or(AppError::NotFound("Profile not found".into()))?;

    if let Some(first_name) = payload.first_name {
        profile.first_name = first_name;
    }
    if let Some(last_name) = payload.last_name {
        profile.last_name = last_name;
    }
    if payload.phone.is_some() {
        profile.phone = payload.phone;
    }
    if payload.profile_image.is_some() {
        profile.profile_image = payload.profile_image;
    }

    let updated = state.profile_repo.update(&profile).await?;
    Ok(Json(updated))
}
