use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Service: soft-delete aware listing
        manager
            .create_index(
                Index::create()
                    .name("idx_service_active_deleted")
                    .table(Service::Table)
                    .col(Service::Active)
                    .col(Service::IsDeleted)
                    .to_owned(),
            )
            .await?;

        // MenuItem: category lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_menu_item_category")
                    .table(MenuItem::Table)
                    .col(MenuItem::Category)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_service_active_deleted").table(Service::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_menu_item_category").table(MenuItem::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Service { Table, Active, IsDeleted }

#[derive(DeriveIden)]
enum MenuItem { Table, Category }
