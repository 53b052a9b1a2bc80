use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::ride::{self, RideStatus};
use crate::entities::user;
use crate::error::{AppError, AppResult};
use crate::policies;
use crate::services::notifier;

/// Grams of CO2 emitted per kilometer by a solo-driven car; the baseline for
/// the sharing comparison.
const SOLO_EMISSION_G_PER_KM: f64 = 150.0;

const MAX_LOCATION_LEN: usize = 255;
const MAX_DESCRIPTION_LEN: usize = 1000;
const MAX_SEATS: i32 = 99;

#[derive(Debug, Clone)]
pub struct CreateRide {
    pub start_location: String,
    pub end_location: String,
    pub departure_datetime: DateTime<Utc>,
    pub available_seats: i32,
    pub distance_km: Option<f64>,
    pub description: Option<String>,
}

/// Partial update applied by the driver while the ride is active.
#[derive(Debug, Clone, Default)]
pub struct UpdateRide {
    pub start_location: Option<String>,
    pub end_location: Option<String>,
    pub departure_datetime: Option<DateTime<Utc>>,
    pub available_seats: Option<i32>,
    pub distance_km: Option<f64>,
    pub description: Option<String>,
}

/// Estimated CO2 avoided by sharing versus everyone driving alone, in
/// kilograms rounded to two decimals. Capacity is the listed seats plus the
/// driver. Zero when no distance is recorded.
pub fn carbon_saving_kg(distance_km: Option<f64>, available_seats: i32) -> f64 {
    let Some(distance) = distance_km else {
        return 0.0;
    };
    if distance <= 0.0 {
        return 0.0;
    }

    let seats_total = (available_seats + 1) as f64;
    let emission_alone = distance * SOLO_EMISSION_G_PER_KM;
    let emission_shared = emission_alone / seats_total;
    let saved_grams = emission_alone - emission_shared;

    (saved_grams / 1000.0 * 100.0).round() / 100.0
}

pub struct RideService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> RideService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a ride posting and trigger the new-ride notification fan-out.
    /// The fan-out runs on a spawned task; its outcome never affects the
    /// creation result.
    pub async fn create(
        &self,
        driver_id: Uuid,
        input: CreateRide,
        now: DateTime<Utc>,
    ) -> AppResult<ride::Model> {
        validate_location(&input.start_location, "start location")?;
        validate_location(&input.end_location, "end location")?;

        if input.departure_datetime <= now {
            return Err(AppError::Validation(
                "The departure time must be in the future.".to_string(),
            ));
        }
        if input.available_seats < 1 {
            return Err(AppError::Validation(
                "There must be at least one available seat.".to_string(),
            ));
        }
        if input.available_seats > MAX_SEATS {
            return Err(AppError::Validation(format!(
                "There may be at most {} available seats.",
                MAX_SEATS
            )));
        }
        if let Some(distance) = input.distance_km {
            if distance <= 0.0 {
                return Err(AppError::Validation(
                    "The distance must be greater than 0 kilometers.".to_string(),
                ));
            }
        }
        validate_description(input.description.as_deref())?;

        let now_tz = now.fixed_offset();
        let ride = ride::ActiveModel {
            id: Set(Uuid::new_v4()),
            driver_id: Set(driver_id),
            start_location: Set(input.start_location),
            end_location: Set(input.end_location),
            departure_datetime: Set(input.departure_datetime.fixed_offset()),
            available_seats: Set(input.available_seats),
            distance_km: Set(input.distance_km),
            description: Set(input.description),
            status: Set(RideStatus::Active),
            created_at: Set(now_tz),
            updated_at: Set(now_tz),
        }
        .insert(self.db)
        .await?;

        tracing::info!(
            ride_id = %ride.id,
            start_location = %ride.start_location,
            end_location = %ride.end_location,
            "Ride created"
        );

        let db = self.db.clone();
        let created = ride.clone();
        tokio::spawn(async move {
            notifier::notify_interested_users(&db, &created).await;
        });

        Ok(ride)
    }

    /// Apply a driver's edit to an active ride.
    pub async fn update(
        &self,
        ride_id: Uuid,
        caller_id: Uuid,
        patch: UpdateRide,
        now: DateTime<Utc>,
    ) -> AppResult<ride::Model> {
        let ride = self.find(ride_id).await?;

        if !policies::can_update_ride(caller_id, &ride) {
            if ride.driver_id != caller_id {
                return Err(AppError::Forbidden(
                    "You are not authorized to update this ride.".to_string(),
                ));
            }
            return Err(AppError::InvalidState(
                "This ride cannot be modified anymore.".to_string(),
            ));
        }

        if let Some(start) = &patch.start_location {
            validate_location(start, "start location")?;
        }
        if let Some(end) = &patch.end_location {
            validate_location(end, "end location")?;
        }
        if let Some(departure) = patch.departure_datetime {
            if departure <= now {
                return Err(AppError::Validation(
                    "The departure time must be in the future.".to_string(),
                ));
            }
        }
        if let Some(seats) = patch.available_seats {
            if seats < 0 {
                return Err(AppError::Validation(
                    "The number of available seats cannot be negative.".to_string(),
                ));
            }
            if seats > MAX_SEATS {
                return Err(AppError::Validation(format!(
                    "There may be at most {} available seats.",
                    MAX_SEATS
                )));
            }
        }
        if let Some(distance) = patch.distance_km {
            if distance < 0.0 {
                return Err(AppError::Validation(
                    "The distance cannot be negative.".to_string(),
                ));
            }
        }
        validate_description(patch.description.as_deref())?;

        let mut active: ride::ActiveModel = ride.into();
        if let Some(start) = patch.start_location {
            active.start_location = Set(start);
        }
        if let Some(end) = patch.end_location {
            active.end_location = Set(end);
        }
        if let Some(departure) = patch.departure_datetime {
            active.departure_datetime = Set(departure.fixed_offset());
        }
        if let Some(seats) = patch.available_seats {
            active.available_seats = Set(seats);
        }
        if let Some(distance) = patch.distance_km {
            active.distance_km = Set(Some(distance));
        }
        if let Some(description) = patch.description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(now.fixed_offset());

        let updated = active.update(self.db).await?;
        Ok(updated)
    }

    /// Cancel an active ride. Re-cancelling a terminal ride is rejected, not
    /// treated as a no-op.
    pub async fn cancel(&self, ride_id: Uuid, caller_id: Uuid) -> AppResult<ride::Model> {
        let ride = self.find(ride_id).await?;

        if !policies::can_cancel_ride(caller_id, &ride) {
            if ride.driver_id != caller_id {
                return Err(AppError::Forbidden(
                    "You are not authorized to cancel this ride.".to_string(),
                ));
            }
            return Err(AppError::InvalidState(
                "This ride cannot be modified anymore.".to_string(),
            ));
        }

        let mut active: ride::ActiveModel = ride.into();
        active.status = Set(RideStatus::Cancelled);
        active.updated_at = Set(Utc::now().fixed_offset());
        let cancelled = active.update(self.db).await?;

        tracing::info!(ride_id = %cancelled.id, "Ride cancelled");
        Ok(cancelled)
    }

    /// Complete an active ride and credit the carbon saving to every
    /// passenger holding a confirmed booking. Crediting is best-effort per
    /// user: one failure is logged and the rest are still credited.
    pub async fn complete(&self, ride_id: Uuid, caller_id: Uuid) -> AppResult<ride::Model> {
        let ride = self.find(ride_id).await?;

        if !policies::can_complete_ride(caller_id, &ride) {
            if ride.driver_id != caller_id {
                return Err(AppError::Forbidden(
                    "You are not authorized to complete this ride.".to_string(),
                ));
            }
            return Err(AppError::InvalidState(
                "This ride cannot be modified anymore.".to_string(),
            ));
        }

        let saving_kg = carbon_saving_kg(ride.distance_km, ride.available_seats);

        let mut active: ride::ActiveModel = ride.into();
        active.status = Set(RideStatus::Completed);
        active.updated_at = Set(Utc::now().fixed_offset());
        let completed = active.update(self.db).await?;

        if saving_kg > 0.0 {
            self.credit_confirmed_passengers(&completed, saving_kg).await?;
        }

        tracing::info!(ride_id = %completed.id, saving_kg, "Ride completed");
        Ok(completed)
    }

    /// Administrative removal of a ride; bookings cascade.
    pub async fn delete(&self, ride_id: Uuid) -> AppResult<()> {
        self.find(ride_id).await?;
        ride::Entity::delete_by_id(ride_id).exec(self.db).await?;
        tracing::info!(ride_id = %ride_id, "Ride deleted by administrator");
        Ok(())
    }

    pub async fn find(&self, ride_id: Uuid) -> AppResult<ride::Model> {
        ride::Entity::find_by_id(ride_id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Ride not found".to_string()))
    }

    async fn credit_confirmed_passengers(
        &self,
        ride: &ride::Model,
        saving_kg: f64,
    ) -> AppResult<()> {
        let confirmed = booking::Entity::find()
            .filter(booking::Column::RideId.eq(ride.id))
            .filter(booking::Column::Status.eq(BookingStatus::Confirmed))
            .all(self.db)
            .await?;

        for booking in confirmed {
            let result = user::Entity::update_many()
                .col_expr(
                    user::Column::CarbonSavingKg,
                    Expr::col(user::Column::CarbonSavingKg).add(saving_kg),
                )
                .filter(user::Column::Id.eq(booking.user_id))
                .exec(self.db)
                .await;

            if let Err(e) = result {
                tracing::error!(
                    user_id = %booking.user_id,
                    ride_id = %ride.id,
                    error = %e,
                    "Failed to credit carbon saving"
                );
            }
        }

        Ok(())
    }
}

fn validate_location(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("The {} is required.", field)));
    }
    if value.len() > MAX_LOCATION_LEN {
        return Err(AppError::Validation(format!(
            "The {} may be at most {} characters.",
            field, MAX_LOCATION_LEN
        )));
    }
    Ok(())
}

fn validate_description(value: Option<&str>) -> AppResult<()> {
    if let Some(description) = value {
        if description.len() > MAX_DESCRIPTION_LEN {
            return Err(AppError::Validation(format!(
                "The description may be at most {} characters.",
                MAX_DESCRIPTION_LEN
            )));
        }
    }
    Ok(())
}
