mod common;

use chrono::{Duration, Utc};
use sea_orm::EntityTrait;
use uuid::Uuid;

use ride_share_backend::entities::ride::{self, RideStatus};
use ride_share_backend::entities::user;
use ride_share_backend::error::AppError;
use ride_share_backend::services::ride::{CreateRide, UpdateRide};
use ride_share_backend::services::{BookingService, RideService};

fn new_ride_input(seats: i32) -> CreateRide {
    CreateRide {
        start_location: "CityA".to_string(),
        end_location: "CityB".to_string(),
        departure_datetime: Utc::now() + Duration::days(1),
        available_seats: seats,
        distance_km: Some(100.0),
        description: None,
    }
}

#[tokio::test]
async fn create_starts_active() {
    let db = common::setup_db().await;
    let driver = common::create_user(&db, "driver@example.com", "Driver").await;

    let ride = RideService::new(&db)
        .create(driver.id, new_ride_input(3), Utc::now())
        .await
        .unwrap();

    assert_eq!(ride.status, RideStatus::Active);
    assert_eq!(ride.available_seats, 3);
    assert_eq!(ride.driver_id, driver.id);
}

#[tokio::test]
async fn create_rejects_past_departure() {
    let db = common::setup_db().await;
    let driver = common::create_user(&db, "driver@example.com", "Driver").await;

    let mut input = new_ride_input(3);
    input.departure_datetime = Utc::now() - Duration::hours(1);

    let err = RideService::new(&db)
        .create(driver.id, input, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn create_requires_at_least_one_seat() {
    let db = common::setup_db().await;
    let driver = common::create_user(&db, "driver@example.com", "Driver").await;

    let err = RideService::new(&db)
        .create(driver.id, new_ride_input(0), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn only_the_driver_may_update() {
    let db = common::setup_db().await;
    let driver = common::create_user(&db, "driver@example.com", "Driver").await;
    let stranger = common::create_user(&db, "other@example.com", "Other").await;
    let ride = common::create_active_ride(&db, driver.id, "CityA", "CityB", 3, None).await;

    let patch = UpdateRide {
        description: Some("Updated".to_string()),
        ..Default::default()
    };
    let err = RideService::new(&db)
        .update(ride.id, stranger.id, patch, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn update_rejects_past_departure() {
    let db = common::setup_db().await;
    let driver = common::create_user(&db, "driver@example.com", "Driver").await;
    let ride = common::create_active_ride(&db, driver.id, "CityA", "CityB", 3, None).await;

    let patch = UpdateRide {
        departure_datetime: Some(Utc::now() - Duration::hours(1)),
        ..Default::default()
    };
    let err = RideService::new(&db)
        .update(ride.id, driver.id, patch, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn update_applies_patch_for_driver() {
    let db = common::setup_db().await;
    let driver = common::create_user(&db, "driver@example.com", "Driver").await;
    let ride = common::create_active_ride(&db, driver.id, "CityA", "CityB", 3, None).await;

    let patch = UpdateRide {
        available_seats: Some(5),
        distance_km: Some(42.0),
        ..Default::default()
    };
    let updated = RideService::new(&db)
        .update(ride.id, driver.id, patch, Utc::now())
        .await
        .unwrap();

    assert_eq!(updated.available_seats, 5);
    assert_eq!(updated.distance_km, Some(42.0));
    assert_eq!(updated.start_location, "CityA");
}

#[tokio::test]
async fn terminal_rides_reject_every_transition() {
    let db = common::setup_db().await;
    let driver = common::create_user(&db, "driver@example.com", "Driver").await;
    let ride = common::create_active_ride(&db, driver.id, "CityA", "CityB", 3, None).await;

    let service = RideService::new(&db);
    service.cancel(ride.id, driver.id).await.unwrap();

    // A second cancel is rejected, not a no-op.
    let err = service.cancel(ride.id, driver.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    let err = service.complete(ride.id, driver.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    let patch = UpdateRide {
        available_seats: Some(9),
        ..Default::default()
    };
    let err = service
        .update(ride.id, driver.id, patch, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    let stored = ride::Entity::find_by_id(ride.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, RideStatus::Cancelled);
}

#[tokio::test]
async fn complete_credits_only_confirmed_passengers() {
    let db = common::setup_db().await;
    let driver = common::create_user(&db, "driver@example.com", "Driver").await;
    let confirmed = common::create_user(&db, "confirmed@example.com", "Confirmed").await;
    let pending = common::create_user(&db, "pending@example.com", "Pending").await;
    let cancelled = common::create_user(&db, "cancelled@example.com", "Cancelled").await;

    // 5 seats, 3 bookings: 2 seats remain, so seats_total = 3 at completion.
    // 90 km: alone 13500 g, shared 4500 g, saved 9000 g = 9 kg.
    let ride = common::create_active_ride(&db, driver.id, "CityA", "CityB", 5, Some(90.0)).await;

    let bookings = BookingService::new(&db, false);
    let b_confirmed = bookings.create(confirmed.id, ride.id).await.unwrap();
    bookings.create(pending.id, ride.id).await.unwrap();
    let b_cancelled = bookings.create(cancelled.id, ride.id).await.unwrap();

    bookings.confirm(b_confirmed.id, driver.id).await.unwrap();
    bookings.cancel(b_cancelled.id, cancelled.id).await.unwrap();

    let completed = RideService::new(&db)
        .complete(ride.id, driver.id)
        .await
        .unwrap();
    assert_eq!(completed.status, RideStatus::Completed);

    let db_ref = &db;
    let reload = |id: Uuid| async move {
        user::Entity::find_by_id(id)
            .one(db_ref)
            .await
            .unwrap()
            .unwrap()
            .carbon_saving_kg
    };
    assert_eq!(reload(confirmed.id).await, 9.0);
    assert_eq!(reload(pending.id).await, 0.0);
    assert_eq!(reload(cancelled.id).await, 0.0);
    assert_eq!(reload(driver.id).await, 0.0);
}

#[tokio::test]
async fn admin_delete_removes_ride() {
    let db = common::setup_db().await;
    let driver = common::create_user(&db, "driver@example.com", "Driver").await;
    let ride = common::create_active_ride(&db, driver.id, "CityA", "CityB", 3, None).await;

    let service = RideService::new(&db);
    service.delete(ride.id).await.unwrap();

    let err = service.find(ride.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
