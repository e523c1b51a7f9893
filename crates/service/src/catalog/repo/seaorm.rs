use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use crate::catalog::domain::MenuItem;
use crate::catalog::repository::CatalogRepository;
use crate::errors::ServiceError;

pub struct SeaOrmCatalogRepository {
    pub db: DatabaseConnection,
}

#[async_trait::async_trait]
impl CatalogRepository for SeaOrmCatalogRepository {
    async fn service_exists(&self, id: Uuid) -> Result<bool, ServiceError> {
        let count = models::service::Entity::find_by_id(id)
            .count(&self.db)
            .await
            .map_err(ServiceError::from_db)?;
        Ok(count > 0)
    }

    async fn find_menu_items(&self, ids: &[Uuid]) -> Result<Vec<MenuItem>, ServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        models::menu_item::Entity::find()
            .filter(models::menu_item::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(ServiceError::from_db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ActiveModelTrait, Set};

    #[tokio::test]
    async fn soft_deleted_service_still_exists() -> anyhow::Result<()> {
        let Some(db) = crate::test_support::get_db().await? else { return Ok(()) };
        let svc = models::service::create(&db, &format!("Catalog Repo {}", Uuid::new_v4()), "repository test").await?;
        let repo = SeaOrmCatalogRepository { db };

        let mut am: models::service::ActiveModel = svc.clone().into();
        am.is_deleted = Set(true);
        am.update(&repo.db).await?;

        assert!(repo.service_exists(svc.id).await?);
        assert!(!repo.service_exists(Uuid::new_v4()).await?);
        assert!(repo.find_menu_items(&[]).await?.is_empty());

        models::service::Entity::delete_by_id(svc.id).exec(&repo.db).await?;
        Ok(())
    }
}
