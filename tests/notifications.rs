mod common;

use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use ride_share_backend::entities::{notification, notification_preference};
use ride_share_backend::error::AppError;
use ride_share_backend::services::notifier;
use ride_share_backend::services::ride::CreateRide;
use ride_share_backend::services::{PreferenceService, RideService};

async fn insert_preference(
    db: &sea_orm::DatabaseConnection,
    user_id: Uuid,
    city: &str,
    is_active: bool,
) -> notification_preference::Model {
    notification_preference::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        city: Set(city.to_string()),
        is_active: Set(is_active),
        created_at: Set(Utc::now().fixed_offset()),
    }
    .insert(db)
    .await
    .unwrap()
}

async fn notifications_for(
    db: &sea_orm::DatabaseConnection,
    user_id: Uuid,
) -> Vec<notification::Model> {
    notification::Entity::find()
        .filter(notification::Column::UserId.eq(user_id))
        .all(db)
        .await
        .unwrap()
}

#[tokio::test]
async fn fanout_matches_start_or_end_city_exactly() {
    let db = common::setup_db().await;
    let driver = common::create_user(&db, "driver@example.com", "Driver").await;
    let start_fan = common::create_user(&db, "a@example.com", "A").await;
    let end_fan = common::create_user(&db, "b@example.com", "B").await;
    let elsewhere = common::create_user(&db, "c@example.com", "C").await;

    insert_preference(&db, start_fan.id, "CityA", true).await;
    insert_preference(&db, end_fan.id, "CityB", true).await;
    insert_preference(&db, elsewhere.id, "CityC", true).await;

    let ride = common::create_active_ride(&db, driver.id, "CityA", "CityB", 3, None).await;
    notifier::notify_interested_users(&db, &ride).await;

    let sent = notifications_for(&db, start_fan.id).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].ride_id, ride.id);
    assert_eq!(sent[0].start_location, "CityA");
    assert_eq!(sent[0].end_location, "CityB");
    assert_eq!(sent[0].message, "New ride available from CityA to CityB");

    assert_eq!(notifications_for(&db, end_fan.id).await.len(), 1);
    assert_eq!(notifications_for(&db, elsewhere.id).await.len(), 0);
}

#[tokio::test]
async fn inactive_preferences_are_ignored() {
    let db = common::setup_db().await;
    let driver = common::create_user(&db, "driver@example.com", "Driver").await;
    let muted = common::create_user(&db, "muted@example.com", "Muted").await;

    insert_preference(&db, muted.id, "CityA", false).await;

    let ride = common::create_active_ride(&db, driver.id, "CityA", "CityB", 3, None).await;
    notifier::notify_interested_users(&db, &ride).await;

    assert_eq!(notifications_for(&db, muted.id).await.len(), 0);
}

#[tokio::test]
async fn one_notification_per_matching_preference() {
    let db = common::setup_db().await;
    let driver = common::create_user(&db, "driver@example.com", "Driver").await;
    let both_ends = common::create_user(&db, "both@example.com", "Both").await;

    // Preferences for both the start and the end city of the same ride.
    insert_preference(&db, both_ends.id, "CityA", true).await;
    insert_preference(&db, both_ends.id, "CityB", true).await;

    let ride = common::create_active_ride(&db, driver.id, "CityA", "CityB", 3, None).await;
    notifier::notify_interested_users(&db, &ride).await;

    assert_eq!(notifications_for(&db, both_ends.id).await.len(), 2);
}

#[tokio::test]
async fn ride_creation_triggers_the_fanout() {
    let db = common::setup_db().await;
    let driver = common::create_user(&db, "driver@example.com", "Driver").await;
    let fan = common::create_user(&db, "fan@example.com", "Fan").await;
    insert_preference(&db, fan.id, "CityA", true).await;

    RideService::new(&db)
        .create(
            driver.id,
            CreateRide {
                start_location: "CityA".to_string(),
                end_location: "CityB".to_string(),
                departure_datetime: Utc::now() + Duration::days(1),
                available_seats: 3,
                distance_km: None,
                description: None,
            },
            Utc::now(),
        )
        .await
        .unwrap();

    // The fan-out runs on a spawned task decoupled from the request.
    let mut sent = Vec::new();
    for _ in 0..50 {
        sent = notifications_for(&db, fan.id).await;
        if !sent.is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert_eq!(sent.len(), 1);
}

#[tokio::test]
async fn replace_all_trims_dedupes_and_replaces() {
    let db = common::setup_db().await;
    let user = common::create_user(&db, "user@example.com", "User").await;
    let service = PreferenceService::new(&db);

    insert_preference(&db, user.id, "OldCity", true).await;

    let stored = service
        .replace_all(user.id, " CityA , CityB ,CityA,, ")
        .await
        .unwrap();

    let cities: Vec<&str> = stored.iter().map(|p| p.city.as_str()).collect();
    assert_eq!(cities, vec!["CityA", "CityB"]);
    assert!(stored.iter().all(|p| p.is_active));

    // The old list is gone entirely.
    let all = service.list(user.id).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|p| p.city != "OldCity"));
}

#[tokio::test]
async fn replace_all_with_empty_input_clears_the_list() {
    let db = common::setup_db().await;
    let user = common::create_user(&db, "user@example.com", "User").await;
    let service = PreferenceService::new(&db);

    insert_preference(&db, user.id, "CityA", true).await;

    let stored = service.replace_all(user.id, "  ").await.unwrap();
    assert!(stored.is_empty());
    assert!(service.list(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn preference_deletion_is_owner_only() {
    let db = common::setup_db().await;
    let owner = common::create_user(&db, "owner@example.com", "Owner").await;
    let stranger = common::create_user(&db, "other@example.com", "Other").await;
    let service = PreferenceService::new(&db);

    let preference = insert_preference(&db, owner.id, "CityA", true).await;

    let err = service.delete(preference.id, stranger.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    service.delete(preference.id, owner.id).await.unwrap();
    let err = service.delete(preference.id, owner.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
