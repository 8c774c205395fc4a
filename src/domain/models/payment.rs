use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Processing,
    Completed,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_method_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethodKind {
    Card,
    Upi,
    Wallet,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct PaymentMethod {
    pub id: String,
    pub owner_id: String,
    pub kind: PaymentMethodKind,
    pub last4: Option<String>,
    pub brand: Option<String>,
    pub expiry_month: Option<i32>,
    pub expiry_year: Option<i32>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NewPaymentMethodParams {
    pub owner_id: String,
    pub kind: PaymentMethodKind,
    pub last4: Option<String>,
    pub brand: Option<String>,
    pub expiry_month: Option<i32>,
    pub expiry_year: Option<i32>,
    pub is_default: bool,
}

impl PaymentMethod {
    pub fn new(params: NewPaymentMethodParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id: params.owner_id,
            kind: params.kind,
            last4: params.last4,
            brand: params.brand,
            expiry_month: params.expiry_month,
            expiry_year: params.expiry_year,
            is_default: params.is_default,
            created_at: Utc::now(),
        }
    }
}

/// Simulated payment bookkeeping. A payment row only exists once the gateway
/// has settled the charge; booking creation is the effect of that settlement.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Payment {
    pub id: String,
    pub booking_id: String,
    pub ride_id: String,
    pub payer_id: String,
    pub amount: f64,
    pub currency: String,
    pub status: PaymentStatus,
    pub payment_method_id: String,
    pub gateway_reference: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

pub struct NewPaymentParams {
    pub booking_id: String,
    pub ride_id: String,
    pub payer_id: String,
    pub amount: f64,
    pub currency: String,
    pub payment_method_id: String,
    pub gateway_reference: String,
}

impl Payment {
    pub fn completed(params: NewPaymentParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            booking_id: params.booking_id,
            ride_id: params.ride_id,
            payer_id: params.payer_id,
            amount: params.amount,
            currency: params.currency,
            status: PaymentStatus::Completed,
            payment_method_id: params.payment_method_id,
            gateway_reference: params.gateway_reference,
            created_at: now,
            completed_at: Some(now),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "refund_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RefundStatus {
    Pending,
    Completed,
    Rejected,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct RefundRequest {
    pub id: String,
    pub payment_id: String,
    pub amount: f64,
    pub reason: String,
    pub status: RefundStatus,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl RefundRequest {
    pub fn new(payment_id: String, amount: f64, reason: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            payment_id,
            amount,
            reason,
            status: RefundStatus::Pending,
            requested_at: Utc::now(),
            processed_at: None,
        }
    }
}
