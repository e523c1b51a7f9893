//! Create `service_selection` table.
//! One row per (service, configuration_version); older versions stay as frozen snapshots.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceSelection::Table)
                    .if_not_exists()
                    .col(uuid(ServiceSelection::Id).primary_key())
                    .col(uuid(ServiceSelection::ServiceId).not_null())
                    .col(integer(ServiceSelection::ConfigurationVersion).not_null())
                    .col(json_binary(ServiceSelection::Options).not_null())
                    .col(json_binary(ServiceSelection::History).not_null())
                    .col(boolean(ServiceSelection::IsLocked).not_null().default(false))
                    .col(timestamp_with_time_zone_null(ServiceSelection::LockedAt))
                    .col(string_len_null(ServiceSelection::LockedBy, 128))
                    .col(big_integer(ServiceSelection::Revision).not_null().default(0))
                    .col(timestamp_with_time_zone(ServiceSelection::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(ServiceSelection::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_selection_service")
                            .from(ServiceSelection::Table, ServiceSelection::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one selection per service per configuration version
        manager
            .create_index(
                Index::create()
                    .name("uniq_service_selection_service_version")
                    .table(ServiceSelection::Table)
                    .col(ServiceSelection::ServiceId)
                    .col(ServiceSelection::ConfigurationVersion)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceSelection::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceSelection {
    Table,
    Id,
    ServiceId,
    ConfigurationVersion,
    Options,
    History,
    IsLocked,
    LockedAt,
    LockedBy,
    Revision,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Service { Table, Id }
