use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::notification_preference;
use crate::error::{AppError, AppResult};
use crate::policies;

const MAX_CITY_LEN: usize = 255;

pub struct PreferenceService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> PreferenceService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Replace the user's whole city list from a comma-separated string.
    /// Cities are trimmed, empties dropped, and duplicates removed keeping
    /// the first occurrence. An empty input clears the list.
    pub async fn replace_all(
        &self,
        user_id: Uuid,
        cities: &str,
    ) -> AppResult<Vec<notification_preference::Model>> {
        let mut parsed: Vec<String> = Vec::new();
        for raw in cities.split(',') {
            let city = raw.trim();
            if city.is_empty() {
                continue;
            }
            if city.len() > MAX_CITY_LEN {
                return Err(AppError::Validation(format!(
                    "City names may be at most {} characters.",
                    MAX_CITY_LEN
                )));
            }
            if !parsed.iter().any(|c| c == city) {
                parsed.push(city.to_string());
            }
        }

        let stored = self
            .db
            .transaction::<_, Vec<notification_preference::Model>, AppError>(move |txn| {
                Box::pin(async move {
                    notification_preference::Entity::delete_many()
                        .filter(notification_preference::Column::UserId.eq(user_id))
                        .exec(txn)
                        .await?;

                    let now = Utc::now().fixed_offset();
                    let mut stored = Vec::with_capacity(parsed.len());
                    for city in parsed {
                        let row = notification_preference::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            user_id: Set(user_id),
                            city: Set(city),
                            is_active: Set(true),
                            created_at: Set(now),
                        }
                        .insert(txn)
                        .await?;
                        stored.push(row);
                    }
                    Ok(stored)
                })
            })
            .await
            .map_err(AppError::from)?;

        tracing::info!(user_id = %user_id, count = stored.len(), "Notification preferences replaced");
        Ok(stored)
    }

    /// Remove one preference; owner only.
    pub async fn delete(&self, preference_id: Uuid, caller_id: Uuid) -> AppResult<()> {
        let preference = notification_preference::Entity::find_by_id(preference_id)
            .one(self.db)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Notification preference not found".to_string())
            })?;

        if !policies::can_delete_preference(caller_id, &preference) {
            return Err(AppError::Forbidden(
                "You can only remove your own notification preferences.".to_string(),
            ));
        }

        notification_preference::Entity::delete_by_id(preference_id)
            .exec(self.db)
            .await?;
        Ok(())
    }

    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<notification_preference::Model>> {
        let preferences = notification_preference::Entity::find()
            .filter(notification_preference::Column::UserId.eq(user_id))
            .order_by_asc(notification_preference::Column::CreatedAt)
            .all(self.db)
            .await?;
        Ok(preferences)
    }
}
