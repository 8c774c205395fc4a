use serde::Serialize;
use crate::domain::models::auth::UserProfile;
use crate::domain::models::booking::Booking;
use crate::domain::models::message::Message;
use crate::domain::models::payment::Payment;
use crate::domain::models::ride::{LiveLocation, Location, Ride};

/// Aggregate returned by the single-ride endpoint. `messages` is empty for
/// non-participants and `live_location` is withheld while sharing is off.
#[derive(Serialize)]
pub struct RideDetailsResponse {
    pub ride: Ride,
    pub from: Location,
    pub to: Location,
    pub driver: Option<UserProfile>,
    pub bookings: Vec<Booking>,
    pub messages: Vec<Message>,
    pub live_location: Option<LiveLocation>,
    pub seats_remaining: i32,
}

#[derive(Serialize)]
pub struct BookingCreatedResponse {
    pub booking: Booking,
    pub payment: Payment,
}

#[derive(Serialize)]
pub struct MarkReadResponse {
    pub updated: u64,
}
