use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::entities::{notification, notification_preference, ride};

/// Fan out a "new ride" notification to every user holding an active
/// preference for the ride's start or end city (exact string match).
///
/// Dispatch is fire-and-forget per preference: a failure for one user is
/// logged and the remaining users are still notified. The caller has usually
/// already returned success for the ride creation by the time this runs, so
/// nothing here may roll that back.
pub async fn notify_interested_users(db: &DatabaseConnection, ride: &ride::Model) {
    let preferences = match notification_preference::Entity::find()
        .filter(notification_preference::Column::IsActive.eq(true))
        .filter(
            Condition::any()
                .add(notification_preference::Column::City.eq(ride.start_location.as_str()))
                .add(notification_preference::Column::City.eq(ride.end_location.as_str())),
        )
        .all(db)
        .await
    {
        Ok(preferences) => preferences,
        Err(e) => {
            tracing::error!(
                ride_id = %ride.id,
                error = %e,
                "Failed to query notification preferences"
            );
            return;
        }
    };

    tracing::info!(
        ride_id = %ride.id,
        matched = preferences.len(),
        start_location = %ride.start_location,
        end_location = %ride.end_location,
        "Dispatching new-ride notifications"
    );

    for preference in preferences {
        let row = notification::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(preference.user_id),
            ride_id: Set(ride.id),
            message: Set(format!(
                "New ride available from {} to {}",
                ride.start_location, ride.end_location
            )),
            start_location: Set(ride.start_location.clone()),
            end_location: Set(ride.end_location.clone()),
            created_at: Set(Utc::now().fixed_offset()),
        };

        match row.insert(db).await {
            Ok(_) => {
                tracing::debug!(
                    user_id = %preference.user_id,
                    ride_id = %ride.id,
                    city = %preference.city,
                    "Notification dispatched"
                );
            }
            Err(e) => {
                tracing::error!(
                    user_id = %preference.user_id,
                    ride_id = %ride.id,
                    error = %e,
                    "Failed to dispatch notification"
                );
            }
        }
    }
}
