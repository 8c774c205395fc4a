use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Lifecycle states of a ride. `Active` and `Full` flip automatically with
/// seat accounting; every other transition is driver-initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ride_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum RideStatus {
    Active,
    Full,
    InProgress,
    Completed,
    Cancelled,
}

/// Embedded value object; rides store one for origin and one for destination.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Location {
    pub address: String,
    pub city: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Latest driver-reported position. At most one per ride; overwritten on each
/// report and cleared on completion.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LiveLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Ride {
    pub id: String,
    pub driver_id: String,
    pub from_address: String,
    pub from_city: String,
    pub from_country: String,
    pub from_latitude: Option<f64>,
    pub from_longitude: Option<f64>,
    pub to_address: String,
    pub to_city: String,
    pub to_country: String,
    pub to_latitude: Option<f64>,
    pub to_longitude: Option<f64>,
    pub departure_date: NaiveDate,
    pub departure_time: String,
    pub available_seats: i32,
    pub price_per_seat: f64,
    pub description: Option<String>,
    pub status: RideStatus,
    pub live_location_latitude: Option<f64>,
    pub live_location_longitude: Option<f64>,
    pub live_location_accuracy: Option<f64>,
    pub live_location_timestamp: Option<DateTime<Utc>>,
    pub is_location_sharing_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewRideParams {
    pub driver_id: String,
    pub from: Location,
    pub to: Location,
    pub departure_date: NaiveDate,
    pub departure_time: String,
    pub available_seats: i32,
    pub price_per_seat: f64,
    pub description: Option<String>,
}

impl Ride {
    pub fn new(params: NewRideParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            driver_id: params.driver_id,
            from_address: params.from.address,
            from_city: params.from.city,
            from_country: params.from.country,
            from_latitude: params.from.latitude,
            from_longitude: params.from.longitude,
            to_address: params.to.address,
            to_city: params.to.city,
            to_country: params.to.country,
            to_latitude: params.to.latitude,
            to_longitude: params.to.longitude,
            departure_date: params.departure_date,
            departure_time: params.departure_time,
            available_seats: params.available_seats,
            price_per_seat: params.price_per_seat,
            description: params.description,
            status: RideStatus::Active,
            live_location_latitude: None,
            live_location_longitude: None,
            live_location_accuracy: None,
            live_location_timestamp: None,
            is_location_sharing_enabled: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn from_location(&self) -> Location {
        Location {
            address: self.from_address.clone(),
            city: self.from_city.clone(),
            country: self.from_country.clone(),
            latitude: self.from_latitude,
            longitude: self.from_longitude,
        }
    }

    pub fn to_location(&self) -> Location {
        Location {
            address: self.to_address.clone(),
            city: self.to_city.clone(),
            country: self.to_country.clone(),
            latitude: self.to_latitude,
            longitude: self.to_longitude,
        }
    }

    pub fn live_location(&self) -> Option<LiveLocation> {
        match (self.live_location_latitude, self.live_location_longitude, self.live_location_timestamp) {
            (Some(latitude), Some(longitude), Some(timestamp)) => Some(LiveLocation {
                latitude,
                longitude,
                accuracy: self.live_location_accuracy,
                timestamp,
            }),
            _ => None,
        }
    }
}

/// Filters for the public ride search. City matches are case-insensitive
/// substring matches, as in the original storefront search.
#[derive(Debug, Default, Deserialize)]
pub struct SearchFilters {
    pub from: Option<String>,
    pub to: Option<String>,
    pub date: Option<NaiveDate>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub seats: Option<i32>,
}
