//! Create `service` table.
//! Catalog read model: configurations and selections hang off a service row.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Service::Table)
                    .if_not_exists()
                    .col(uuid(Service::Id).primary_key())
                    .col(string_len(Service::Name, 256).not_null())
                    .col(string_len(Service::Slug, 256).not_null().unique_key())
                    .col(text(Service::Description).not_null())
                    .col(boolean(Service::Active).not_null().default(true))
                    .col(boolean(Service::IsDeleted).not_null().default(false))
                    .col(timestamp_with_time_zone(Service::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Service::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Service::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Service {
    Table,
    Id,
    Name,
    Slug,
    Description,
    Active,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}
