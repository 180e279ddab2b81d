use sea_orm_migration::prelude::*;

use super::m20250601_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Sounds::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sounds::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sounds::Title).string().not_null())
                    .col(ColumnDef::new(Sounds::Category).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Sounds::IsPublic)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Sounds::FilePath).string().not_null())
                    .col(ColumnDef::new(Sounds::UploaderId).integer().not_null())
                    .col(ColumnDef::new(Sounds::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Sounds::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sounds-uploader")
                            .from(Sounds::Table, Sounds::UploaderId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // The home page sorts public sounds by recency on every hit.
        manager
            .create_index(
                Index::create()
                    .name("idx-sounds-public-created-at")
                    .table(Sounds::Table)
                    .col(Sounds::IsPublic)
                    .col(Sounds::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Sounds::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Sounds {
    Table,
    Id,
    Title,
    Category,
    IsPublic,
    FilePath,
    UploaderId,
    CreatedAt,
    UpdatedAt,
}
