use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::ride::{self, RideStatus};
use crate::entities::ride_review;
use crate::error::{AppError, AppResult};

const MAX_COMMENT_LEN: usize = 1000;

pub struct ReviewService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ReviewService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Leave a review on a confirmed booking of a completed ride. The
    /// passenger reviews the driver and vice versa; the counterparty is
    /// derived from who the caller is. One review per direction per booking.
    pub async fn create(
        &self,
        caller_id: Uuid,
        booking_id: Uuid,
        rating: i32,
        comment: Option<String>,
    ) -> AppResult<ride_review::Model> {
        if !(1..=5).contains(&rating) {
            return Err(AppError::Validation(
                "The rating must be between 1 and 5.".to_string(),
            ));
        }
        if let Some(comment) = &comment {
            if comment.len() > MAX_COMMENT_LEN {
                return Err(AppError::Validation(format!(
                    "The comment may be at most {} characters.",
                    MAX_COMMENT_LEN
                )));
            }
        }

        let booking = booking::Entity::find_by_id(booking_id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
        let ride = ride::Entity::find_by_id(booking.ride_id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Ride not found".to_string()))?;

        let (reviewee_id, is_driver_review) = if caller_id == booking.user_id {
            (ride.driver_id, true)
        } else if caller_id == ride.driver_id {
            (booking.user_id, false)
        } else {
            return Err(AppError::Forbidden(
                "Only the passenger or the driver may review this booking.".to_string(),
            ));
        };

        if ride.status != RideStatus::Completed {
            return Err(AppError::InvalidState(
                "Reviews can only be left after the ride is completed.".to_string(),
            ));
        }
        if booking.status != BookingStatus::Confirmed {
            return Err(AppError::InvalidState(
                "Only confirmed bookings can be reviewed.".to_string(),
            ));
        }

        let existing = ride_review::Entity::find()
            .filter(ride_review::Column::BookingId.eq(booking_id))
            .filter(ride_review::Column::ReviewerId.eq(caller_id))
            .filter(ride_review::Column::RevieweeId.eq(reviewee_id))
            .one(self.db)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(
                "You have already reviewed this booking.".to_string(),
            ));
        }

        let review = ride_review::ActiveModel {
            id: Set(Uuid::new_v4()),
            booking_id: Set(booking_id),
            reviewer_id: Set(caller_id),
            reviewee_id: Set(reviewee_id),
            rating: Set(rating),
            comment: Set(comment),
            is_driver_review: Set(is_driver_review),
            created_at: Set(Utc::now().fixed_offset()),
        }
        .insert(self.db)
        .await?;

        tracing::info!(
            review_id = %review.id,
            booking_id = %booking_id,
            reviewer_id = %caller_id,
            "Review created"
        );
        Ok(review)
    }
}
