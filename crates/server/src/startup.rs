use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::Router;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use configs::AppConfig;
use service::catalog::repo::seaorm::SeaOrmCatalogRepository;
use service::configuration::repo::seaorm::SeaOrmConfigurationRepository;
use service::configuration::ConfigurationService;
use service::selection::repo::seaorm::SeaOrmSelectionRepository;
use service::selection::SelectionService;

use crate::errors::StartupError;
use crate::routes::{self, auth};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load `config.toml` (or `CONFIG_PATH`), falling back to environment variables when the file is absent.
pub fn load_config() -> Result<AppConfig, StartupError> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if std::path::Path::new(&path).exists() {
        AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))
    } else {
        warn!(%path, "config file not found, using environment variables");
        AppConfig::from_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))
    }
}

/// Wire SeaORM repositories into both managers.
pub fn build_state(db: DatabaseConnection, cfg: &AppConfig) -> auth::ServerState {
    let catalog = Arc::new(SeaOrmCatalogRepository { db: db.clone() });
    let configs = Arc::new(SeaOrmConfigurationRepository { db: db.clone() });
    let selections = Arc::new(SeaOrmSelectionRepository { db });
    auth::ServerState {
        configurations: Arc::new(ConfigurationService::new(configs.clone(), catalog.clone())),
        selections: Arc::new(SelectionService::new(configs, selections, catalog)),
        selection_cfg: cfg.selection.clone(),
        auth: auth::ServerAuthConfig { jwt_secret: cfg.auth.jwt_secret.clone() },
    }
}

/// Public entry: connect, build the app and serve until `shutdown` resolves.
pub async fn run(cfg: AppConfig, shutdown: impl Future<Output = ()> + Send + 'static) -> anyhow::Result<()> {
    service::metrics::init();

    let db = models::db::connect_with_config(&cfg.database).await?;
    if cfg.database.run_migrations {
        migration::Migrator::up(&db, None).await?;
        info!("migrations applied");
    }

    let app: Router = routes::build_router(build_state(db, &cfg), build_cors());

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, auth = cfg.auth.jwt_secret.is_some(), "listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("server drained");
    Ok(())
}
