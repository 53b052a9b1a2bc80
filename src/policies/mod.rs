//! Authorization gate: pure predicates over the caller and the target row.
//! Services consult these before mutating; the HTTP layer never re-implements
//! ownership checks inline.

use uuid::Uuid;

use crate::entities::notification_preference;
use crate::entities::ride::{self, RideStatus};

/// A ride may be edited only by its driver and only while it is active.
pub fn can_update_ride(user_id: Uuid, ride: &ride::Model) -> bool {
    user_id == ride.driver_id && ride.status == RideStatus::Active
}

pub fn can_cancel_ride(user_id: Uuid, ride: &ride::Model) -> bool {
    user_id == ride.driver_id && ride.status == RideStatus::Active
}

pub fn can_complete_ride(user_id: Uuid, ride: &ride::Model) -> bool {
    user_id == ride.driver_id && ride.status == RideStatus::Active
}

/// Only the driver of the booked ride may confirm a booking.
pub fn can_confirm_booking(user_id: Uuid, ride: &ride::Model) -> bool {
    user_id == ride.driver_id
}

pub fn can_delete_preference(
    user_id: Uuid,
    preference: &notification_preference::Model,
) -> bool {
    user_id == preference.user_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ride_with(driver_id: Uuid, status: RideStatus) -> ride::Model {
        let now = Utc::now().fixed_offset();
        ride::Model {
            id: Uuid::new_v4(),
            driver_id,
            start_location: "CityA".to_string(),
            end_location: "CityB".to_string(),
            departure_datetime: now,
            available_seats: 3,
            distance_km: Some(100.0),
            description: None,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn driver_may_update_active_ride() {
        let driver = Uuid::new_v4();
        let ride = ride_with(driver, RideStatus::Active);

        assert!(can_update_ride(driver, &ride));
        assert!(can_cancel_ride(driver, &ride));
        assert!(can_complete_ride(driver, &ride));
    }

    #[test]
    fn stranger_may_not_update_ride() {
        let ride = ride_with(Uuid::new_v4(), RideStatus::Active);

        assert!(!can_update_ride(Uuid::new_v4(), &ride));
    }

    #[test]
    fn terminal_rides_are_locked_even_for_the_driver() {
        let driver = Uuid::new_v4();

        for status in [RideStatus::Completed, RideStatus::Cancelled] {
            let ride = ride_with(driver, status);
            assert!(!can_update_ride(driver, &ride));
            assert!(!can_cancel_ride(driver, &ride));
            assert!(!can_complete_ride(driver, &ride));
        }
    }

    #[test]
    fn booking_confirmation_ignores_ride_status() {
        let driver = Uuid::new_v4();
        let ride = ride_with(driver, RideStatus::Completed);

        assert!(can_confirm_booking(driver, &ride));
        assert!(!can_confirm_booking(Uuid::new_v4(), &ride));
    }

    #[test]
    fn preference_deletion_is_owner_only() {
        let owner = Uuid::new_v4();
        let pref = notification_preference::Model {
            id: Uuid::new_v4(),
            user_id: owner,
            city: "CityA".to_string(),
            is_active: true,
            created_at: Utc::now().fixed_offset(),
        };

        assert!(can_delete_preference(owner, &pref));
        assert!(!can_delete_preference(Uuid::new_v4(), &pref));
    }
}
