pub mod sqlite_profile_repo;
pub mod sqlite_auth_repo;
pub mod sqlite_ride_repo;
pub mod sqlite_booking_repo;
pub mod sqlite_message_repo;
pub mod sqlite_payment_repo;

pub mod postgres_profile_repo;
pub mod postgres_auth_repo;
pub mod postgres_ride_repo;
pub mod postgres_booking_repo;
pub mod postgres_message_repo;
pub mod postgres_payment_repo;
