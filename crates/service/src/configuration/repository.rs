use async_trait::async_trait;
use uuid::Uuid;

use super::domain::ServiceConfiguration;
use crate::errors::ServiceError;

/// Persistence for service configurations; at most one per service.
#[async_trait]
pub trait ConfigurationRepository: Send + Sync {
    async fn find_by_service(&self, service_id: Uuid) -> Result<Option<ServiceConfiguration>, ServiceError>;
    /// Insert a new configuration; `Conflict` if the service already has one.
    async fn create(&self, config: ServiceConfiguration) -> Result<ServiceConfiguration, ServiceError>;
    /// Compare-and-swap on `config.revision`; returns the stored copy with the next revision.
    async fn save(&self, config: ServiceConfiguration) -> Result<ServiceConfiguration, ServiceError>;
}

/// Simple in-memory repository for tests and local runs
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Default)]
    pub struct MockConfigurationRepository {
        rows: Mutex<HashMap<Uuid, ServiceConfiguration>>, // key: service_id
    }

    #[async_trait]
    impl ConfigurationRepository for MockConfigurationRepository {
        async fn find_by_service(&self, service_id: Uuid) -> Result<Option<ServiceConfiguration>, ServiceError> {
            Ok(self.rows.lock().await.get(&service_id).cloned())
        }

        async fn create(&self, config: ServiceConfiguration) -> Result<ServiceConfiguration, ServiceError> {
            let mut rows = self.rows.lock().await;
            if rows.contains_key(&config.service_id) {
                return Err(ServiceError::Conflict(format!("configuration for service {} already exists", config.service_id)));
            }
            rows.insert(config.service_id, config.clone());
            Ok(config)
        }

        async fn save(&self, mut config: ServiceConfiguration) -> Result<ServiceConfiguration, ServiceError> {
            let mut rows = self.rows.lock().await;
            let stored = rows.get(&config.service_id).ok_or_else(|| ServiceError::not_found("service configuration"))?;
            if stored.revision != config.revision {
                return Err(ServiceError::StaleRevision(format!(
                    "configuration revision {} is behind stored revision {}",
                    config.revision, stored.revision
                )));
            }
            config.revision += 1;
            config.updated_at = Utc::now();
            rows.insert(config.service_id, config.clone());
            Ok(config)
        }
    }
}
