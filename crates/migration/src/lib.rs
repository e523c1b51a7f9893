//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240501_000001_create_service;
mod m20240501_000002_create_menu_item;
mod m20240501_000003_create_service_configuration;
mod m20240501_000004_create_service_selection;
mod m20240501_000005_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240501_000001_create_service::Migration),
            Box::new(m20240501_000002_create_menu_item::Migration),
            Box::new(m20240501_000003_create_service_configuration::Migration),
            Box::new(m20240501_000004_create_service_selection::Migration),
            // Indexes should always be applied last
            Box::new(m20240501_000005_add_indexes::Migration),
        ]
    }
}
