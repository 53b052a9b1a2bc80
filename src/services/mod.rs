pub mod booking;
pub mod notifier;
pub mod preference;
pub mod review;
pub mod ride;

pub use booking::BookingService;
pub use preference::PreferenceService;
pub use review::ReviewService;
pub use ride::RideService;
