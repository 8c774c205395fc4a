use chrono::NaiveDate;
use serde::Deserialize;
use crate::domain::models::payment::PaymentMethodKind;
use crate::domain::models::ride::Location;
use crate::domain::models::user::UserRole;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub phone: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub profile_image: Option<String>,
}

#[derive(Deserialize)]
pub struct LocationPayload {
    pub address: String,
    pub city: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<LocationPayload> for Location {
    fn from(payload: LocationPayload) -> Self {
        Location {
            address: payload.address,
            city: payload.city,
            country: payload.country,
            latitude: payload.latitude,
            longitude: payload.longitude,
        }
    }
}

#[derive(Deserialize)]
pub struct CreateRideRequest {
    pub from: LocationPayload,
    pub to: LocationPayload,
    pub departure_date: NaiveDate,
    pub departure_time: String,
    pub available_seats: i32,
    pub price_per_seat: f64,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct BookRideRequest {
    pub seats: i32,
    pub payment_method_id: String,
}

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Deserialize)]
pub struct UpdateLocationRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
}

#[derive(Deserialize)]
pub struct ToggleSharingRequest {
    pub enabled: bool,
}

#[derive(Deserialize)]
pub struct CreatePaymentMethodRequest {
    pub kind: PaymentMethodKind,
    pub last4: Option<String>,
    pub brand: Option<String>,
    pub expiry_month: Option<i32>,
    pub expiry_year: Option<i32>,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Deserialize)]
pub struct RefundRequestPayload {
    pub reason: Option<String>,
}
