use std::sync::Arc;
use crate::domain::ports::{
    AuthRepository, BookingRepository, MessageRepository, PaymentGateway,
    PaymentRepository, ProfileRepository, RideRepository,
};
use crate::domain::services::auth_service::AuthService;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub profile_repo: Arc<dyn ProfileRepository>,
    pub auth_repo: Arc<dyn AuthRepository>,
    pub ride_repo: Arc<dyn RideRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub message_repo: Arc<dyn MessageRepository>,
    pub payment_repo: Arc<dyn PaymentRepository>,
    pub auth_service: Arc<AuthService>,
    pub payment_gateway: Arc<dyn PaymentGateway>,
}
