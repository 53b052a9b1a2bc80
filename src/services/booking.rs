use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::ride::{self, RideStatus};
use crate::error::{AppError, AppResult};
use crate::policies;

pub struct BookingService<'a> {
    db: &'a DatabaseConnection,
    restore_seats_on_cancel: bool,
}

impl<'a> BookingService<'a> {
    pub fn new(db: &'a DatabaseConnection, restore_seats_on_cancel: bool) -> Self {
        Self {
            db,
            restore_seats_on_cancel,
        }
    }

    /// Reserve a seat on a ride. The booking insert and the seat decrement
    /// commit together or not at all, and the decrement is guarded so two
    /// racing bookings cannot oversell the last seat.
    pub async fn create(&self, passenger_id: Uuid, ride_id: Uuid) -> AppResult<booking::Model> {
        let booking = self
            .db
            .transaction::<_, booking::Model, AppError>(move |txn| {
                Box::pin(async move {
                    let ride = ride::Entity::find_by_id(ride_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| AppError::NotFound("Ride not found".to_string()))?;

                    if ride.status != RideStatus::Active {
                        return Err(AppError::Validation(
                            "This ride is no longer available.".to_string(),
                        ));
                    }
                    if ride.available_seats <= 0 {
                        return Err(AppError::Validation(
                            "No seats available for this ride.".to_string(),
                        ));
                    }
                    if ride.driver_id == passenger_id {
                        return Err(AppError::Validation(
                            "You cannot book your own ride.".to_string(),
                        ));
                    }

                    let existing = booking::Entity::find()
                        .filter(booking::Column::UserId.eq(passenger_id))
                        .filter(booking::Column::RideId.eq(ride_id))
                        .filter(booking::Column::Status.ne(BookingStatus::Cancelled))
                        .one(txn)
                        .await?;
                    if existing.is_some() {
                        return Err(AppError::Validation(
                            "You already have a booking for this ride.".to_string(),
                        ));
                    }

                    let now = Utc::now().fixed_offset();
                    let booking = booking::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        ride_id: Set(ride_id),
                        user_id: Set(passenger_id),
                        status: Set(BookingStatus::Pending),
                        created_at: Set(now),
                        updated_at: Set(now),
                    }
                    .insert(txn)
                    .await?;

                    // Guarded decrement: zero rows means another booking took
                    // the last seat after our read, so the whole unit aborts.
                    let result = ride::Entity::update_many()
                        .col_expr(
                            ride::Column::AvailableSeats,
                            Expr::col(ride::Column::AvailableSeats).sub(1),
                        )
                        .filter(ride::Column::Id.eq(ride_id))
                        .filter(ride::Column::AvailableSeats.gt(0))
                        .filter(ride::Column::Status.eq(RideStatus::Active))
                        .exec(txn)
                        .await?;
                    if result.rows_affected == 0 {
                        return Err(AppError::Validation(
                            "No seats available for this ride.".to_string(),
                        ));
                    }

                    Ok(booking)
                })
            })
            .await
            .map_err(AppError::from)?;

        tracing::info!(
            booking_id = %booking.id,
            ride_id = %booking.ride_id,
            user_id = %booking.user_id,
            "Booking created"
        );
        Ok(booking)
    }

    /// Driver accepts a pending booking. Seats were already reserved at
    /// creation, so confirmation has no seat side effect.
    pub async fn confirm(&self, booking_id: Uuid, caller_id: Uuid) -> AppResult<booking::Model> {
        let (booking, ride) = self.find_with_ride(booking_id).await?;

        if !policies::can_confirm_booking(caller_id, &ride) {
            return Err(AppError::Forbidden(
                "Only the driver can confirm bookings.".to_string(),
            ));
        }
        if ride.status != RideStatus::Active {
            return Err(AppError::InvalidState(
                "This ride is no longer active.".to_string(),
            ));
        }
        if booking.status != BookingStatus::Pending {
            return Err(AppError::InvalidState(
                "Only pending bookings can be confirmed.".to_string(),
            ));
        }

        let mut active: booking::ActiveModel = booking.into();
        active.status = Set(BookingStatus::Confirmed);
        active.updated_at = Set(Utc::now().fixed_offset());
        let confirmed = active.update(self.db).await?;

        tracing::info!(booking_id = %confirmed.id, "Booking confirmed");
        Ok(confirmed)
    }

    /// Cancel a booking, allowed to the passenger who made it or the ride's
    /// driver. The seat is returned to the ride only when the service was
    /// built with `restore_seats_on_cancel`.
    pub async fn cancel(&self, booking_id: Uuid, caller_id: Uuid) -> AppResult<booking::Model> {
        let restore_seats = self.restore_seats_on_cancel;
        let cancelled = self
            .db
            .transaction::<_, booking::Model, AppError>(move |txn| {
                Box::pin(async move {
                    let booking = booking::Entity::find_by_id(booking_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
                    let ride = ride::Entity::find_by_id(booking.ride_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| AppError::NotFound("Ride not found".to_string()))?;

                    if caller_id != booking.user_id && caller_id != ride.driver_id {
                        return Err(AppError::Forbidden(
                            "You can only cancel your own bookings.".to_string(),
                        ));
                    }
                    if booking.status == BookingStatus::Cancelled {
                        return Err(AppError::InvalidState(
                            "This booking is already cancelled.".to_string(),
                        ));
                    }
                    if booking.status == BookingStatus::Confirmed
                        && ride.status == RideStatus::Completed
                    {
                        return Err(AppError::InvalidState(
                            "Bookings on a completed ride can no longer be changed.".to_string(),
                        ));
                    }

                    let mut active: booking::ActiveModel = booking.into();
                    active.status = Set(BookingStatus::Cancelled);
                    active.updated_at = Set(Utc::now().fixed_offset());
                    let cancelled = active.update(txn).await?;

                    if restore_seats && ride.status == RideStatus::Active {
                        ride::Entity::update_many()
                            .col_expr(
                                ride::Column::AvailableSeats,
                                Expr::col(ride::Column::AvailableSeats).add(1),
                            )
                            .filter(ride::Column::Id.eq(ride.id))
                            .exec(txn)
                            .await?;
                    }

                    Ok(cancelled)
                })
            })
            .await
            .map_err(AppError::from)?;

        tracing::info!(booking_id = %cancelled.id, "Booking cancelled");
        Ok(cancelled)
    }

    /// All bookings made by a user with their rides, most recent first.
    pub async fn list(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<(booking::Model, Option<ride::Model>)>> {
        let bookings = booking::Entity::find()
            .filter(booking::Column::UserId.eq(user_id))
            .order_by_desc(booking::Column::CreatedAt)
            .find_also_related(ride::Entity)
            .all(self.db)
            .await?;
        Ok(bookings)
    }

    pub async fn find_with_ride(
        &self,
        booking_id: Uuid,
    ) -> AppResult<(booking::Model, ride::Model)> {
        let booking = booking::Entity::find_by_id(booking_id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
        let ride = ride::Entity::find_by_id(booking.ride_id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Ride not found".to_string()))?;
        Ok((booking, ride))
    }
}
