pub mod admin;
pub mod auth;
pub mod bookings;
pub mod preferences;
pub mod rides;
