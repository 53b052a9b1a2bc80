use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::booking::BookingStatus;
use crate::entities::ride::RideStatus;
use crate::entities::user;
use crate::error::AppResult;
use crate::services::{BookingService, ReviewService};
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub start_location: String,
    pub end_location: String,
    pub departure_datetime: DateTime<Utc>,
    pub ride_status: RideStatus,
    pub driver_name: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// Book a seat on a ride
pub async fn book_ride(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(ride_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let booking = BookingService::new(&state.db, state.config.restore_seats_on_cancel)
        .create(claims.sub, ride_id)
        .await?;

    Ok(Json(serde_json::json!({
        "message": "Booking created successfully!",
        "booking_id": booking.id,
    })))
}

/// List the caller's bookings, most recent first
pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<BookingResponse>>> {
    let bookings = BookingService::new(&state.db, state.config.restore_seats_on_cancel)
        .list(claims.sub)
        .await?;

    let driver_ids: Vec<Uuid> = bookings
        .iter()
        .filter_map(|(_, ride)| ride.as_ref().map(|r| r.driver_id))
        .collect();
    let drivers = user::Entity::find()
        .filter(user::Column::Id.is_in(driver_ids))
        .all(&state.db)
        .await?;

    let responses: Vec<BookingResponse> = bookings
        .into_iter()
        .filter_map(|(b, ride)| {
            let ride = ride?;
            let driver = drivers.iter().find(|d| d.id == ride.driver_id);

            Some(BookingResponse {
                id: b.id,
                ride_id: ride.id,
                start_location: ride.start_location,
                end_location: ride.end_location,
                departure_datetime: ride.departure_datetime.with_timezone(&Utc),
                ride_status: ride.status,
                driver_name: driver.map(|d| d.name.clone()).unwrap_or_default(),
                status: b.status,
                created_at: b.created_at.with_timezone(&Utc),
            })
        })
        .collect();

    Ok(Json(responses))
}

/// Confirm a pending booking (ride driver only)
pub async fn confirm_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    BookingService::new(&state.db, state.config.restore_seats_on_cancel)
        .confirm(booking_id, claims.sub)
        .await?;
    Ok(Json(serde_json::json!({ "message": "Booking confirmed successfully." })))
}

/// Cancel a booking (passenger or ride driver)
pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    BookingService::new(&state.db, state.config.restore_seats_on_cancel)
        .cancel(booking_id, claims.sub)
        .await?;
    Ok(Json(serde_json::json!({ "message": "Booking cancelled successfully." })))
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i32,
    pub comment: Option<String>,
}

/// Review the counterparty of a booking once the ride is completed
pub async fn create_review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<CreateReviewRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let review = ReviewService::new(&state.db)
        .create(claims.sub, booking_id, payload.rating, payload.comment)
        .await?;

    Ok(Json(serde_json::json!({
        "message": "Review submitted successfully.",
        "review_id": review.id,
    })))
}
