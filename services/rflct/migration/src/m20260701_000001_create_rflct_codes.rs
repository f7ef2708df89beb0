use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RflctCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RflctCodes::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RflctCodes::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(RflctCodes::Type).string().not_null())
                    .col(ColumnDef::new(RflctCodes::Description).string())
                    .col(
                        ColumnDef::new(RflctCodes::IsActive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(RflctCodes::UserId).uuid())
                    .col(
                        ColumnDef::new(RflctCodes::UsageCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(RflctCodes::LastUsedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(RflctCodes::Metadata).json_binary())
                    .col(
                        ColumnDef::new(RflctCodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RflctCodes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(RflctCodes::Table)
                    .col(RflctCodes::Type)
                    .name("idx_rflct_codes_type")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(RflctCodes::Table)
                    .col(RflctCodes::IsActive)
                    .name("idx_rflct_codes_is_active")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(RflctCodes::Table)
                    .col(RflctCodes::UserId)
                    .name("idx_rflct_codes_user_id")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(RflctCodes::Table)
                    .col(RflctCodes::CreatedAt)
                    .name("idx_rflct_codes_created_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RflctCodes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RflctCodes {
    Table,
    Id,
    Code,
    Type,
    Description,
    IsActive,
    UserId,
    UsageCount,
    LastUsedAt,
    Metadata,
    CreatedAt,
    UpdatedAt,
}
