use async_trait::async_trait;
use uuid::Uuid;

use super::domain::MenuItem;
use crate::errors::ServiceError;

/// Read-only access to the catalog owned by the rest of the platform.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// True for any stored service, soft-deleted ones included.
    async fn service_exists(&self, id: Uuid) -> Result<bool, ServiceError>;
    /// Return the subset of `ids` that exist, in no particular order.
    async fn find_menu_items(&self, ids: &[Uuid]) -> Result<Vec<MenuItem>, ServiceError>;
}

/// Simple in-memory catalog for tests and local runs
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::{HashMap, HashSet};
    use tokio::sync::Mutex;

    #[derive(Default)]
    pub struct MockCatalogRepository {
        services: Mutex<HashSet<Uuid>>,
        items: Mutex<HashMap<Uuid, MenuItem>>,
    }

    impl MockCatalogRepository {
        pub async fn add_service(&self, name: &str) -> Uuid {
            let id = Uuid::new_v4();
            tracing::debug!(service_id = %id, slug = %models::service::slugify(name), "mock service added");
            self.services.lock().await.insert(id);
            id
        }

        pub async fn add_menu_item(&self, name: &str) -> Uuid {
            let id = Uuid::new_v4();
            let now = Utc::now().into();
            let item = MenuItem {
                id,
                name: name.to_string(),
                image: format!("https://cdn.example.com/{}.png", models::service::slugify(name)),
                item_type: "Veg".into(),
                category: 1,
                active: true,
                people: 10,
                quantity: 1.0,
                measurement: "kg".into(),
                unit_price: 250.0,
                created_at: now,
                updated_at: now,
            };
            self.items.lock().await.insert(id, item);
            id
        }

        pub async fn remove_menu_item(&self, id: Uuid) -> bool {
            self.items.lock().await.remove(&id).is_some()
        }
    }

    #[async_trait]
    impl CatalogRepository for MockCatalogRepository {
        async fn service_exists(&self, id: Uuid) -> Result<bool, ServiceError> {
            Ok(self.services.lock().await.contains(&id))
        }

        async fn find_menu_items(&self, ids: &[Uuid]) -> Result<Vec<MenuItem>, ServiceError> {
            let items = self.items.lock().await;
            Ok(ids.iter().filter_map(|id| items.get(id).cloned()).collect())
        }
    }
}
