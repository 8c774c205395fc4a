use crate::domain::models::payment::{PaymentMethod, PaymentMethodKind};
use crate::domain::ports::{GatewayCharge, PaymentGateway};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;
use uuid::Uuid;

/// Stand-in for a real payment processor. Charges always settle after a
/// short delay unless the method is an expired card.
pub struct SimulatedPaymentGateway {
    settle_ms: u64,
}

impl SimulatedPaymentGateway {
    pub fn new(settle_ms: u64) -> Self {
        Self { settle_ms }
    }

    fn card_is_expired(method: &PaymentMethod) -> bool {
        if method.kind != PaymentMethodKind::Card {
            return false;
        }
        match (method.expiry_year, method.expiry_month) {
            (Some(year), Some(month)) => {
                let now = Utc::now();
                year < now.year() || (year == now.year() && month < now.month() as i32)
            }
            _ => false,
        }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedPaymentGateway {
    async fn charge(&self, amount: f64, currency: &str, method: &PaymentMethod) -> Result<GatewayCharge, AppError> {
        if amount <= 0.0 {
            return Err(AppError::PaymentFailed("Charge amount must be positive".into()));
        }
        if Self::card_is_expired(method) {
            return Err(AppError::PaymentFailed("Card has expired".into()));
        }

        sleep(Duration::from_millis(self.settle_ms)).await;

        let reference = format!("sim_{}", Uuid::new_v4());
        info!(reference = %reference, amount, currency, "Charge settled");
        Ok(GatewayCharge { reference })
    }

    async fn refund(&self, gateway_reference: &str, amount: f64) -> Result<(), AppError> {
        sleep(Duration::from_millis(self.settle_ms)).await;
        info!(reference = %gateway_reference, amount, "Refund settled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::payment::NewPaymentMethodParams;

    fn card(expiry_month: i32, expiry_year: i32) -> PaymentMethod {
        PaymentMethod::new(NewPaymentMethodParams {
            owner_id: "u1".into(),
            kind: PaymentMethodKind::Card,
            last4: Some("4242".into()),
            brand: Some("visa".into()),
            expiry_month: Some(expiry_month),
            expiry_year: Some(expiry_year),
            is_default: true,
        })
    }

    #[tokio::test]
    async fn expired_card_is_declined() {
        let gateway = SimulatedPaymentGateway::new(0);
        let result = gateway.charge(25.0, "USD", &card(1, 2020)).await;
        assert!(matches!(result, Err(AppError::PaymentFailed(_))));
    }

    #[tokio::test]
    async fn valid_card_settles_with_reference() {
        let gateway = SimulatedPaymentGateway::new(0);
        let charge = gateway.charge(25.0, "USD", &card(12, 2099)).await.unwrap();
        assert!(charge.reference.starts_with("sim_"));
    }

    #[tokio::test]
    async fn non_positive_amount_is_rejected() {
        let gateway = SimulatedPaymentGateway::new(0);
        let result = gateway.charge(0.0, "USD", &card(12, 2099)).await;
        assert!(matches!(result, Err(AppError::PaymentFailed(_))));
    }
}
