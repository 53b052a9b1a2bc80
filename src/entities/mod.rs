pub mod booking;
pub mod notification;
pub mod notification_preference;
pub mod ride;
pub mod ride_review;
pub mod user;
