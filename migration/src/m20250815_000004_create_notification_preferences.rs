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
                    .table(NotificationPreference::Table)
                    .if_not_exists()
                    .col(uuid(NotificationPreference::Id).primary_key())
                    .col(uuid(NotificationPreference::UserId).not_null())
                    .col(string_len(NotificationPreference::City, 255).not_null())
                    .col(
                        boolean(NotificationPreference::IsActive)
                            .not_null()
                            .default(true),
                    )
                    .col(
                        timestamp_with_time_zone(NotificationPreference::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_preference_user")
                            .from(
                                NotificationPreference::Table,
                                NotificationPreference::UserId,
                            )
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // The notifier filters on city equality for every ride creation.
        manager
            .create_index(
                Index::create()
                    .name("idx_notification_preference_city")
                    .table(NotificationPreference::Table)
                    .col(NotificationPreference::City)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(NotificationPreference::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
pub enum NotificationPreference {
    Table,
    Id,
    UserId,
    City,
    IsActive,
    CreatedAt,
}
