pub mod auth;
pub mod booking;
pub mod message;
pub mod payment;
pub mod ride;
pub mod user;
