#![cfg(test)]
use std::sync::Arc;

use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::catalog::repository::mock::MockCatalogRepository;
use crate::configuration::repository::mock::MockConfigurationRepository;
use crate::configuration::ConfigurationService;
use crate::selection::repository::mock::MockSelectionRepository;
use crate::selection::SelectionService;

/// Both managers wired to fresh in-memory repositories.
pub struct Fixture {
    pub catalog: Arc<MockCatalogRepository>,
    pub config_repo: Arc<MockConfigurationRepository>,
    pub selection_repo: Arc<MockSelectionRepository>,
    pub configurations: ConfigurationService,
    pub selections: SelectionService,
}

impl Fixture {
    pub fn new() -> Self {
        let catalog = Arc::new(MockCatalogRepository::default());
        let configs = Arc::new(MockConfigurationRepository::default());
        let selection_repo = Arc::new(MockSelectionRepository::default());
        Self {
            configurations: ConfigurationService::new(configs.clone(), catalog.clone()),
            selections: SelectionService::new(configs.clone(), selection_repo.clone(), catalog.clone()),
            catalog,
            config_repo: configs,
            selection_repo,
        }
    }

    pub async fn service(&self, name: &str) -> Uuid { self.catalog.add_service(name).await }

    pub async fn menu_item(&self, name: &str) -> Uuid { self.catalog.add_menu_item(name).await }
}

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Connection for SeaORM repository tests; `None` when no database is configured.
pub async fn get_db() -> anyhow::Result<Option<DatabaseConnection>> {
    if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
        return Ok(None);
    }
    MIGRATED
        .get_or_try_init(|| async {
            let db = models::db::connect().await?;
            migration::Migrator::up(&db, None).await?;
            Ok::<_, anyhow::Error>(())
        })
        .await?;
    // Fresh connection for the current test's runtime
    Ok(Some(models::db::connect().await?))
}
