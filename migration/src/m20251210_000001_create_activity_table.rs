use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Activity::Table)
                    .if_not_exists()
                    .col(string(Activity::UserId).primary_key())
                    .col(string(Activity::UserName))
                    .col(big_integer(Activity::Points).default(0))
                    .col(big_integer_null(Activity::VoicePoints))
                    .col(timestamp_with_time_zone_null(Activity::LastActivity))
                    .col(timestamp_with_time_zone_null(Activity::LastBoostCheck))
                    .col(boolean_null(Activity::IsBooster))
                    .col(big_integer_null(Activity::Version))
                    .col(timestamp_with_time_zone_null(Activity::LastUpdate))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activity_points")
                    .table(Activity::Table)
                    .col(Activity::Points)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activity_voice_points")
                    .table(Activity::Table)
                    .col(Activity::VoicePoints)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Activity::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Activity {
    Table,
    UserId,
    UserName,
    Points,
    VoicePoints,
    LastActivity,
    LastBoostCheck,
    IsBooster,
    Version,
    LastUpdate,
}
