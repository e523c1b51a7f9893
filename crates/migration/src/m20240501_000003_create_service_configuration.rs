//! Create `service_configuration` table.
//! One row per service; option types and rules are stored as jsonb.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceConfiguration::Table)
                    .if_not_exists()
                    .col(uuid(ServiceConfiguration::Id).primary_key())
                    .col(uuid(ServiceConfiguration::ServiceId).not_null().unique_key())
                    .col(json_binary(ServiceConfiguration::OptionTypes).not_null())
                    .col(json_binary(ServiceConfiguration::SelectionRules).not_null())
                    .col(integer(ServiceConfiguration::Version).not_null().default(1))
                    .col(boolean(ServiceConfiguration::IsActive).not_null().default(true))
                    .col(big_integer(ServiceConfiguration::Revision).not_null().default(0))
                    .col(timestamp_with_time_zone(ServiceConfiguration::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(ServiceConfiguration::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_configuration_service")
                            .from(ServiceConfiguration::Table, ServiceConfiguration::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceConfiguration::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceConfiguration {
    Table,
    Id,
    ServiceId,
    OptionTypes,
    SelectionRules,
    Version,
    IsActive,
    Revision,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Service { Table, Id }
