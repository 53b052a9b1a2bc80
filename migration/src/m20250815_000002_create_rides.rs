use sea_orm_migration::{prelude::*, schema::*};

use super::m20250815_000001_create_users::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ride::Table)
                    .if_not_exists()
                    .col(uuid(Ride::Id).primary_key())
                    .col(uuid(Ride::DriverId).not_null())
                    .col(string_len(Ride::StartLocation, 255).not_null())
                    .col(string_len(Ride::EndLocation, 255).not_null())
                    .col(timestamp_with_time_zone(Ride::DepartureDatetime).not_null())
                    .col(integer(Ride::AvailableSeats).not_null())
                    .col(double_null(Ride::DistanceKm))
                    .col(text_null(Ride::Description))
                    .col(string_len(Ride::Status, 16).not_null().default("active"))
                    .col(
                        timestamp_with_time_zone(Ride::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Ride::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ride_driver")
                            .from(Ride::Table, Ride::DriverId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ride::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Ride {
    Table,
    Id,
    DriverId,
    StartLocation,
    EndLocation,
    DepartureDatetime,
    AvailableSeats,
    DistanceKm,
    Description,
    Status,
    CreatedAt,
    UpdatedAt,
}
