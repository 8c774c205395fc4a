use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, info_span, Instrument};
use crate::domain::models::payment::RefundStatus;
use crate::state::AppState;

pub async fn start_background_worker(state: Arc<AppState>) {
    info!("Starting refund settlement worker...");

    loop {
        settle_pending_refunds(&state).await;
        sleep(Duration::from_secs(5)).await;
    }
}

/// Drains one batch of pending refund requests through the payment gateway.
/// A gateway failure marks the request rejected rather than retrying forever.
pub async fn settle_pending_refunds(state: &Arc<AppState>) {
    match state.payment_repo.find_pending_refunds(10).await {
        Ok(refunds) => {
            for refund in refunds {
                let span = info_span!(
                    "refund_settlement",
                    refund_id = %refund.id,
                    payment_id = %refund.payment_id
                );

                async {
                    match process_refund(state, &refund.id, &refund.payment_id, refund.amount).await {
                        Ok(status) => info!(?status, "Refund processed"),
                        Err(e) => error!("Refund settlement failed: {:?}", e),
                    }
                }
                    .instrument(span)
                    .await;
            }
        }
        Err(e) => error!("Failed to fetch pending refunds: {:?}", e),
    }
}

async fn process_refund(
    state: &Arc<AppState>,
    refund_id: &str,
    payment_id: &str,
    amount: f64,
) -> Result<RefundStatus, crate::error::AppError> {
    let payment = state.payment_repo.find_payment(payment_id).await?
        .ok_or(crate::error::AppError::NotFound(format!("Payment {} not found", payment_id)))?;

    let status = match state.payment_gateway.refund(&payment.gateway_reference, amount).await {
        Ok(()) => RefundStatus::Completed,
        Err(e) => {
            error!("Gateway declined refund: {:?}", e);
            RefundStatus::Rejected
        }
    };

    state.payment_repo.settle_refund(refund_id, status).await?;
    Ok(status)
}
