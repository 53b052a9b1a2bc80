use sea_orm_migration::{prelude::*, schema::*};

use super::m20250815_000001_create_users::User;
use super::m20250815_000002_create_rides::Ride;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notification::Table)
                    .if_not_exists()
                    .col(uuid(Notification::Id).primary_key())
                    .col(uuid(Notification::UserId).not_null())
                    .col(uuid(Notification::RideId).not_null())
                    .col(string_len(Notification::Message, 255).not_null())
                    .col(string_len(Notification::StartLocation, 255).not_null())
                    .col(string_len(Notification::EndLocation, 255).not_null())
                    .col(
                        timestamp_with_time_zone(Notification::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_user")
                            .from(Notification::Table, Notification::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_ride")
                            .from(Notification::Table, Notification::RideId)
                            .to(Ride::Table, Ride::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notification::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Notification {
    Table,
    Id,
    UserId,
    RideId,
    Message,
    StartLocation,
    EndLocation,
    CreatedAt,
}
