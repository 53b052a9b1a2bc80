#![allow(dead_code)]

use chrono::{Duration, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use uuid::Uuid;

use ride_share_backend::entities::ride::{self, RideStatus};
use ride_share_backend::entities::user::{self, UserRole};

/// Fresh in-memory database with all migrations applied.
pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to sqlite");
    Migrator::up(&db, None).await.expect("Failed to run migrations");
    db
}

pub async fn create_user(db: &DatabaseConnection, email: &str, name: &str) -> user::Model {
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set("not-a-real-hash".to_string()),
        name: Set(name.to_string()),
        role: Set(UserRole::User),
        avatar_url: Set(None),
        carbon_saving_kg: Set(0.0),
        created_at: Set(Utc::now().fixed_offset()),
    }
    .insert(db)
    .await
    .expect("Failed to insert user")
}

/// An active ride departing tomorrow, inserted directly so fixtures don't go
/// through the service layer.
pub async fn create_active_ride(
    db: &DatabaseConnection,
    driver_id: Uuid,
    start: &str,
    end: &str,
    seats: i32,
    distance_km: Option<f64>,
) -> ride::Model {
    let now = Utc::now().fixed_offset();
    ride::ActiveModel {
        id: Set(Uuid::new_v4()),
        driver_id: Set(driver_id),
        start_location: Set(start.to_string()),
        end_location: Set(end.to_string()),
        departure_datetime: Set((Utc::now() + Duration::days(1)).fixed_offset()),
        available_seats: Set(seats),
        distance_km: Set(distance_km),
        description: Set(None),
        status: Set(RideStatus::Active),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to insert ride")
}
