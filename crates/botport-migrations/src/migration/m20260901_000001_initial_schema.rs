//! Initial schema: every table an import writes to
//!
//! Uniqueness lives in the primary keys. Responses and slots are unique per
//! project; conversation and utterance ids are unique across projects.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BotResponses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BotResponses::ProjectId).string().not_null())
                    .col(ColumnDef::new(BotResponses::Key).string().not_null())
                    .col(ColumnDef::new(BotResponses::Values).json().not_null())
                    .col(ColumnDef::new(BotResponses::TextIndex).text().not_null())
                    .col(
                        ColumnDef::new(BotResponses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(BotResponses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(BotResponses::ProjectId)
                            .col(BotResponses::Key),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Slots::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Slots::ProjectId).string().not_null())
                    .col(ColumnDef::new(Slots::Name).string().not_null())
                    .col(ColumnDef::new(Slots::SlotType).string().not_null())
                    .col(ColumnDef::new(Slots::Settings).json().not_null())
                    .col(
                        ColumnDef::new(Slots::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Slots::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(Index::create().col(Slots::ProjectId).col(Slots::Name))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Conversations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Conversations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Conversations::ProjectId).string().not_null())
                    .col(ColumnDef::new(Conversations::Body).json().not_null())
                    .col(
                        ColumnDef::new(Conversations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_conversations_project_id")
                    .table(Conversations::Table)
                    .col(Conversations::ProjectId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Activity::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Activity::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Activity::ProjectId).string().not_null())
                    .col(ColumnDef::new(Activity::Text).text().not_null())
                    .col(ColumnDef::new(Activity::Language).string().null())
                    .col(ColumnDef::new(Activity::Body).json().not_null())
                    .col(
                        ColumnDef::new(Activity::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activity_project_id")
                    .table(Activity::Table)
                    .col(Activity::ProjectId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProjectSettings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ProjectSettings::ProjectId).string().not_null())
                    .col(
                        ColumnDef::new(ProjectSettings::Kind)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProjectSettings::Language)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(ProjectSettings::Content).text().not_null())
                    .col(
                        ColumnDef::new(ProjectSettings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(ProjectSettings::ProjectId)
                            .col(ProjectSettings::Kind)
                            .col(ProjectSettings::Language),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Instances::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Instances::ProjectId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Instances::Body).json().not_null())
                    .col(
                        ColumnDef::new(Instances::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Projects::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Projects::Body).json().not_null())
                    .col(
                        ColumnDef::new(Projects::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Projects::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Instances::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProjectSettings::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Activity::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Conversations::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Slots::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BotResponses::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum BotResponses {
    Table,
    ProjectId,
    Key,
    Values,
    TextIndex,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Slots {
    Table,
    ProjectId,
    Name,
    SlotType,
    Settings,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Conversations {
    Table,
    Id,
    ProjectId,
    Body,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Activity {
    Table,
    Id,
    ProjectId,
    Text,
    Language,
    Body,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ProjectSettings {
    Table,
    ProjectId,
    Kind,
    Language,
    Content,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Instances {
    Table,
    ProjectId,
    Body,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
    Body,
    UpdatedAt,
}
