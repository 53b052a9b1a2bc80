use sea_orm_migration::{prelude::*, schema::*};

use super::m20250815_000001_create_users::User;
use super::m20250815_000003_create_bookings::Booking;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RideReview::Table)
                    .if_not_exists()
                    .col(uuid(RideReview::Id).primary_key())
                    .col(uuid(RideReview::BookingId).not_null())
                    .col(uuid(RideReview::ReviewerId).not_null())
                    .col(uuid(RideReview::RevieweeId).not_null())
                    .col(integer(RideReview::Rating).not_null())
                    .col(text_null(RideReview::Comment))
                    .col(boolean(RideReview::IsDriverReview).not_null())
                    .col(
                        timestamp_with_time_zone(RideReview::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ride_review_booking")
                            .from(RideReview::Table, RideReview::BookingId)
                            .to(Booking::Table, Booking::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ride_review_reviewer")
                            .from(RideReview::Table, RideReview::ReviewerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ride_review_reviewee")
                            .from(RideReview::Table, RideReview::RevieweeId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One review per direction per booking.
        manager
            .create_index(
                Index::create()
                    .name("idx_ride_review_unique")
                    .table(RideReview::Table)
                    .col(RideReview::BookingId)
                    .col(RideReview::ReviewerId)
                    .col(RideReview::RevieweeId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RideReview::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum RideReview {
    Table,
    Id,
    BookingId,
    ReviewerId,
    RevieweeId,
    Rating,
    Comment,
    IsDriverReview,
    CreatedAt,
}
