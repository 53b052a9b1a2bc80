use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::ride::{self, RideStatus};
use crate::entities::user;
use crate::error::{AppError, AppResult};
use crate::services::ride::{carbon_saving_kg, CreateRide, UpdateRide};
use crate::services::RideService;
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct RideResponse {
    pub id: Uuid,
    pub driver: DriverInfo,
    pub start_location: String,
    pub end_location: String,
    pub departure_datetime: DateTime<Utc>,
    pub available_seats: i32,
    pub distance_km: Option<f64>,
    pub description: Option<String>,
    pub status: RideStatus,
    pub carbon_saving_kg: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct DriverInfo {
    pub id: Uuid,
    pub name: String,
}

fn ride_response(ride: ride::Model, driver: Option<&user::Model>) -> RideResponse {
    RideResponse {
        carbon_saving_kg: carbon_saving_kg(ride.distance_km, ride.available_seats),
        id: ride.id,
        driver: DriverInfo {
            id: ride.driver_id,
            name: driver.map(|d| d.name.clone()).unwrap_or_default(),
        },
        start_location: ride.start_location,
        end_location: ride.end_location,
        departure_datetime: ride.departure_datetime.with_timezone(&Utc),
        available_seats: ride.available_seats,
        distance_km: ride.distance_km,
        description: ride.description,
        status: ride.status,
        created_at: ride.created_at.with_timezone(&Utc),
    }
}

/// List all rides, newest first, with their computed carbon saving
pub async fn list_rides(State(state): State<AppState>) -> AppResult<Json<Vec<RideResponse>>> {
    let rides = ride::Entity::find()
        .order_by_desc(ride::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let driver_ids: Vec<Uuid> = rides.iter().map(|r| r.driver_id).collect();
    let drivers = user::Entity::find()
        .filter(user::Column::Id.is_in(driver_ids))
        .all(&state.db)
        .await?;

    let responses = rides
        .into_iter()
        .map(|r| {
            let driver = drivers.iter().find(|d| d.id == r.driver_id);
            ride_response(r, driver)
        })
        .collect();

    Ok(Json(responses))
}

/// Get ride details
pub async fn get_ride(
    State(state): State<AppState>,
    Path(ride_id): Path<Uuid>,
) -> AppResult<Json<RideResponse>> {
    let ride = ride::Entity::find_by_id(ride_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Ride not found".to_string()))?;

    let driver = user::Entity::find_by_id(ride.driver_id).one(&state.db).await?;

    Ok(Json(ride_response(ride, driver.as_ref())))
}

#[derive(Debug, Deserialize)]
pub struct CreateRideRequest {
    pub start_location: String,
    pub end_location: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub departure_date: String,
    /// Time of day, `HH:MM`.
    pub departure_time: String,
    pub available_seats: i32,
    pub distance_km: Option<f64>,
    pub description: Option<String>,
}

/// Post a new ride
pub async fn create_ride(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateRideRequest>,
) -> AppResult<Json<RideResponse>> {
    let date = NaiveDate::parse_from_str(&payload.departure_date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("The departure date must be a valid date.".to_string()))?;
    let time = NaiveTime::parse_from_str(&payload.departure_time, "%H:%M")
        .map_err(|_| AppError::Validation("The departure time must be a valid time.".to_string()))?;
    let departure_datetime = NaiveDateTime::new(date, time).and_utc();

    let ride = RideService::new(&state.db)
        .create(
            claims.sub,
            CreateRide {
                start_location: payload.start_location,
                end_location: payload.end_location,
                departure_datetime,
                available_seats: payload.available_seats,
                distance_km: payload.distance_km,
                description: payload.description,
            },
            Utc::now(),
        )
        .await?;

    let driver = user::Entity::find_by_id(ride.driver_id).one(&state.db).await?;
    Ok(Json(ride_response(ride, driver.as_ref())))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRideRequest {
    pub start_location: Option<String>,
    pub end_location: Option<String>,
    pub departure_datetime: Option<DateTime<Utc>>,
    pub available_seats: Option<i32>,
    pub distance_km: Option<f64>,
    pub description: Option<String>,
}

/// Update a ride (driver only, while active)
pub async fn update_ride(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(ride_id): Path<Uuid>,
    Json(payload): Json<UpdateRideRequest>,
) -> AppResult<Json<RideResponse>> {
    let ride = RideService::new(&state.db)
        .update(
            ride_id,
            claims.sub,
            UpdateRide {
                start_location: payload.start_location,
                end_location: payload.end_location,
                departure_datetime: payload.departure_datetime,
                available_seats: payload.available_seats,
                distance_km: payload.distance_km,
                description: payload.description,
            },
            Utc::now(),
        )
        .await?;

    let driver = user::Entity::find_by_id(ride.driver_id).one(&state.db).await?;
    Ok(Json(ride_response(ride, driver.as_ref())))
}

/// Cancel a ride (driver only, while active)
pub async fn cancel_ride(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(ride_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    RideService::new(&state.db).cancel(ride_id, claims.sub).await?;
    Ok(Json(serde_json::json!({ "message": "Ride cancelled successfully." })))
}

/// Complete a ride (driver only, while active); credits carbon savings to
/// passengers with confirmed bookings
pub async fn complete_ride(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(ride_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    RideService::new(&state.db).complete(ride_id, claims.sub).await?;
    Ok(Json(serde_json::json!({ "message": "Ride completed successfully." })))
}
