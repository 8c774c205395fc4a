use crate::domain::models::{
    auth::RefreshTokenRecord,
    booking::Booking,
    message::Message,
    payment::{Payment, PaymentMethod, RefundRequest, RefundStatus},
    ride::{LiveLocation, Ride, RideStatus, SearchFilters},
    user::User,
};
use crate::error::AppError;
use async_trait::async_trait;

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn update(&self, user: &User) -> Result<User, AppError>;
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn create_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), AppError>;
    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, AppError>;
    async fn delete_refresh_token(&self, token_hash: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait RideRepository: Send + Sync {
    async fn create(&self, ride: &Ride) -> Result<Ride, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Ride>, AppError>;
    async fn list_by_driver(&self, driver_id: &str) -> Result<Vec<Ride>, AppError>;
    async fn search(&self, filters: &SearchFilters) -> Result<Vec<Ride>, AppError>;
    /// Guarded status flip: succeeds only while the ride is in one of `from`,
    /// otherwise reports a conflict. The guard runs inside the update so
    /// concurrent writers cannot both win.
    async fn transition_status(&self, id: &str, from: &[RideStatus], to: RideStatus) -> Result<Ride, AppError>;
    /// `in-progress` -> `completed`; clears the live-location slot and
    /// disables sharing in the same statement.
    async fn complete(&self, id: &str) -> Result<Ride, AppError>;
    /// Driver cancellation cascade: marks the ride cancelled, voids all
    /// confirmed bookings and files one refund request per settled payment,
    /// all computed inside the same transaction so a payment landing mid-
    /// cancel cannot be voided without a refund.
    async fn cancel_with_bookings(&self, id: &str, refund_reason: &str) -> Result<Ride, AppError>;
    async fn update_live_location(&self, id: &str, location: &LiveLocation) -> Result<Ride, AppError>;
    async fn set_location_sharing(&self, id: &str, enabled: bool) -> Result<Ride, AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Persists booking and settled payment together, re-checking seat
    /// capacity and recomputing the ride's `active`/`full` status inside the
    /// transaction.
    async fn create_with_payment(&self, booking: &Booking, payment: &Payment) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn list_by_ride(&self, ride_id: &str) -> Result<Vec<Booking>, AppError>;
    async fn list_by_passenger(&self, passenger_id: &str) -> Result<Vec<Booking>, AppError>;
    /// Soft-cancels the booking, recomputes the ride's capacity status and
    /// files the refund request (if any) in one transaction.
    async fn cancel(&self, booking: &Booking, refund: Option<&RefundRequest>) -> Result<Booking, AppError>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn create(&self, message: &Message) -> Result<Message, AppError>;
    async fn list_by_ride(&self, ride_id: &str) -> Result<Vec<Message>, AppError>;
    /// Marks all messages on the ride not authored by `viewer_id` as read.
    /// Idempotent.
    async fn mark_read(&self, ride_id: &str, viewer_id: &str) -> Result<u64, AppError>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create_method(&self, method: &PaymentMethod) -> Result<PaymentMethod, AppError>;
    async fn find_method(&self, owner_id: &str, id: &str) -> Result<Option<PaymentMethod>, AppError>;
    async fn list_methods(&self, owner_id: &str) -> Result<Vec<PaymentMethod>, AppError>;
    async fn find_payment(&self, id: &str) -> Result<Option<Payment>, AppError>;
    async fn find_completed_by_booking(&self, booking_id: &str) -> Result<Option<Payment>, AppError>;
    async fn list_by_payer(&self, payer_id: &str) -> Result<Vec<Payment>, AppError>;
    async fn create_refund(&self, refund: &RefundRequest) -> Result<RefundRequest, AppError>;
    async fn list_refunds_by_payer(&self, payer_id: &str) -> Result<Vec<RefundRequest>, AppError>;
    async fn find_pending_refunds(&self, limit: i32) -> Result<Vec<RefundRequest>, AppError>;
    /// Settling a refund as `completed` also flips the payment to `refunded`.
    async fn settle_refund(&self, refund_id: &str, status: RefundStatus) -> Result<(), AppError>;
}

pub struct GatewayCharge {
    pub reference: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, amount: f64, currency: &str, method: &PaymentMethod) -> Result<GatewayCharge, AppError>;
    async fn refund(&self, gateway_reference: &str, amount: f64) -> Result<(), AppError>;
}
