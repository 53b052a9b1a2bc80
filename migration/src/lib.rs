pub use sea_orm_migration::prelude::*;

mod m20250815_000001_create_users;
mod m20250815_000002_create_rides;
mod m20250815_000003_create_bookings;
mod m20250815_000004_create_notification_preferences;
mod m20250815_000005_create_notifications;
mod m20250815_000006_create_ride_reviews;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250815_000001_create_users::Migration),
            Box::new(m20250815_000002_create_rides::Migration),
            Box::new(m20250815_000003_create_bookings::Migration),
            Box::new(m20250815_000004_create_notification_preferences::Migration),
            Box::new(m20250815_000005_create_notifications::Migration),
            Box::new(m20250815_000006_create_ride_reviews::Migration),
        ]
    }
}
