pub mod auth;
pub mod booking;
pub mod health;
pub mod location;
pub mod message;
pub mod payment;
pub mod profile;
pub mod ride;
