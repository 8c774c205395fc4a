use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::info;
use crate::api::dtos::requests::{CreatePaymentMethodRequest, RefundRequestPayload};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::payment::{NewPaymentMethodParams, PaymentMethod, PaymentStatus, RefundRequest};
use crate::error::AppError;
use crate::state::AppState;

pub async fn payment_history(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let payments = state.payment_repo.list_by_payer(&user.id).await?;
    Ok(Json(payments))
}

pub async fn create_payment_method(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreatePaymentMethodRequest>,
) -> Result<impl IntoResponse, AppError> {
    let method = state.payment_repo.create_method(&PaymentMethod::new(NewPaymentMethodParams {
        owner_id: user.id,
        kind: payload.kind,
        last4: payload.last4,
        brand: payload.brand,
        expiry_month: payload.expiry_month,
        expiry_year: payload.expiry_year,
        is_default: payload.is_default,
    })).await?;

    Ok((StatusCode::CREATED, Json(method)))
}

pub async fn list_payment_methods(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let methods = state.payment_repo.list_methods(&user.id).await?;
    Ok(Json(methods))
}

/// Files a manual refund request against one of the caller's settled
/// payments. The background worker settles it through the gateway.
pub async fn request_refund(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(payment_id): Path<String>,
    Json(payload): Json<RefundRequestPayload>,
) -> Result<impl IntoResponse, AppError> {
    let payment = state.payment_repo.find_payment(&payment_id).await?
        .ok_or(AppError::NotFound("Payment not found".into()))?;

    if payment.payer_id != user.id {
        return Err(AppError::Forbidden("Only the payer can request a refund".into()));
    }
    if payment.status != PaymentStatus::Completed {
        return Err(AppError::Conflict("Only a completed payment can be refunded".into()));
    }

    let reason = payload.reason.unwrap_or_else(|| "Requested by payer".to_string());
    let refund = state.payment_repo
        .create_refund(&RefundRequest::new(payment.id, payment.amount, reason))
        .await?;

    info!("Refund requested: {} for payment {}", refund.id, payment_id);
    Ok((StatusCode::CREATED, Json(refund)))
}

pub async fn list_refunds(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let refunds = state.payment_repo.list_refunds_by_payer(&user.id).await?;
    Ok(Json(refunds))
}
