//! Create `menu_item` table.
//! Catalog items referenced by selection entries.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MenuItem::Table)
                    .if_not_exists()
                    .col(uuid(MenuItem::Id).primary_key())
                    .col(string_len(MenuItem::Name, 256).not_null())
                    .col(string_len(MenuItem::Image, 1024).not_null())
                    .col(string_len(MenuItem::ItemType, 16).not_null())
                    .col(integer(MenuItem::Category).not_null())
                    .col(boolean(MenuItem::Active).not_null().default(true))
                    .col(integer(MenuItem::People).not_null())
                    .col(double(MenuItem::Quantity).not_null())
                    .col(string_len(MenuItem::Measurement, 8).not_null())
                    .col(double(MenuItem::UnitPrice).not_null())
                    .col(timestamp_with_time_zone(MenuItem::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(MenuItem::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(MenuItem::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum MenuItem {
    Table,
    Id,
    Name,
    Image,
    ItemType,
    Category,
    Active,
    People,
    Quantity,
    Measurement,
    UnitPrice,
    CreatedAt,
    UpdatedAt,
}
