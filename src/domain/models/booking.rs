use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

/// A passenger's reservation of one or more seats on a ride. Soft-cancelled
/// only; payments keep referencing the row.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub ride_id: String,
    pub passenger_id: String,
    pub seats_booked: i32,
    pub total_price: f64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Total price is fixed at booking time from the ride's current per-seat
    /// price.
    pub fn new(ride_id: String, passenger_id: String, seats_booked: i32, price_per_seat: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            ride_id,
            passenger_id,
            seats_booked,
            total_price: price_per_seat * seats_booked as f64,
            status: BookingStatus::Confirmed,
            created_at: Utc::now(),
        }
    }
}
