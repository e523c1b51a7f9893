use async_trait::async_trait;
use uuid::Uuid;

use super::domain::ServiceSelection;
use crate::errors::ServiceError;

/// Persistence for selections; unique per (service, configuration version).
#[async_trait]
pub trait SelectionRepository: Send + Sync {
    async fn find(&self, service_id: Uuid, configuration_version: i32) -> Result<Option<ServiceSelection>, ServiceError>;
    /// Selection with the highest configuration version for the service.
    async fn find_latest(&self, service_id: Uuid) -> Result<Option<ServiceSelection>, ServiceError>;
    /// Insert a new selection; `Conflict` if one already exists for the pair.
    async fn create(&self, selection: ServiceSelection) -> Result<ServiceSelection, ServiceError>;
    /// Compare-and-swap on `selection.revision`.
    async fn save(&self, selection: ServiceSelection) -> Result<ServiceSelection, ServiceError>;
}

/// Simple in-memory repository for tests and local runs
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Default)]
    pub struct MockSelectionRepository {
        rows: Mutex<HashMap<(Uuid, i32), ServiceSelection>>,
    }

    impl MockSelectionRepository {
        /// Number of stored selections for a service, across versions.
        pub async fn count_for(&self, service_id: Uuid) -> usize {
            self.rows.lock().await.keys().filter(|(sid, _)| *sid == service_id).count()
        }
    }

    #[async_trait]
    impl SelectionRepository for MockSelectionRepository {
        async fn find(&self, service_id: Uuid, configuration_version: i32) -> Result<Option<ServiceSelection>, ServiceError> {
            Ok(self.rows.lock().await.get(&(service_id, configuration_version)).cloned())
        }

        async fn find_latest(&self, service_id: Uuid) -> Result<Option<ServiceSelection>, ServiceError> {
            let rows = self.rows.lock().await;
            Ok(rows
                .values()
                .filter(|s| s.service_id == service_id)
                .max_by_key(|s| s.configuration_version)
                .cloned())
        }

        async fn create(&self, selection: ServiceSelection) -> Result<ServiceSelection, ServiceError> {
            let key = (selection.service_id, selection.configuration_version);
            let mut rows = self.rows.lock().await;
            if rows.contains_key(&key) {
                return Err(ServiceError::Conflict(format!(
                    "selection for version {} already exists",
                    selection.configuration_version
                )));
            }
            rows.insert(key, selection.clone());
            Ok(selection)
        }

        async fn save(&self, mut selection: ServiceSelection) -> Result<ServiceSelection, ServiceError> {
            let key = (selection.service_id, selection.configuration_version);
            let mut rows = self.rows.lock().await;
            let stored = rows.get(&key).ok_or_else(|| ServiceError::not_found("selection"))?;
            if stored.revision != selection.revision {
                return Err(ServiceError::StaleRevision(format!(
                    "selection revision {} is behind stored revision {}",
                    selection.revision, stored.revision
                )));
            }
            selection.revision += 1;
            selection.updated_at = Utc::now();
            rows.insert(key, selection.clone());
            Ok(selection)
        }
    }
}
