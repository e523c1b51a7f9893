use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use models::service_selection::{self, SelectionHistory, SelectionOptions};

use crate::errors::ServiceError;
use crate::selection::domain::ServiceSelection;
use crate::selection::repository::SelectionRepository;

pub struct SeaOrmSelectionRepository {
    pub db: DatabaseConnection,
}

#[async_trait::async_trait]
impl SelectionRepository for SeaOrmSelectionRepository {
    async fn find(&self, service_id: Uuid, configuration_version: i32) -> Result<Option<ServiceSelection>, ServiceError> {
        let res = service_selection::Entity::find()
            .filter(service_selection::Column::ServiceId.eq(service_id))
            .filter(service_selection::Column::ConfigurationVersion.eq(configuration_version))
            .one(&self.db)
            .await
            .map_err(ServiceError::from_db)?;
        Ok(res.map(ServiceSelection::from))
    }

    async fn find_latest(&self, service_id: Uuid) -> Result<Option<ServiceSelection>, ServiceError> {
        let res = service_selection::Entity::find()
            .filter(service_selection::Column::ServiceId.eq(service_id))
            .order_by_desc(service_selection::Column::ConfigurationVersion)
            .one(&self.db)
            .await
            .map_err(ServiceError::from_db)?;
        Ok(res.map(ServiceSelection::from))
    }

    async fn create(&self, selection: ServiceSelection) -> Result<ServiceSelection, ServiceError> {
        let am = service_selection::ActiveModel {
            id: Set(selection.id),
            service_id: Set(selection.service_id),
            configuration_version: Set(selection.configuration_version),
            options: Set(SelectionOptions(selection.options)),
            history: Set(SelectionHistory(selection.history)),
            is_locked: Set(selection.is_locked),
            locked_at: Set(selection.locked_at.map(Into::into)),
            locked_by: Set(selection.locked_by),
            revision: Set(selection.revision),
            created_at: Set(selection.created_at.into()),
            updated_at: Set(selection.updated_at.into()),
        };
        let created = am.insert(&self.db).await.map_err(ServiceError::from_db)?;
        Ok(created.into())
    }

    async fn save(&self, mut selection: ServiceSelection) -> Result<ServiceSelection, ServiceError> {
        let expected = selection.revision;
        let now = Utc::now();
        let changes = service_selection::ActiveModel {
            options: Set(SelectionOptions(selection.options.clone())),
            history: Set(SelectionHistory(selection.history.clone())),
            is_locked: Set(selection.is_locked),
            locked_at: Set(selection.locked_at.map(Into::into)),
            locked_by: Set(selection.locked_by.clone()),
            revision: Set(expected + 1),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        let res = service_selection::Entity::update_many()
            .set(changes)
            .filter(service_selection::Column::Id.eq(selection.id))
            .filter(service_selection::Column::Revision.eq(expected))
            .exec(&self.db)
            .await
            .map_err(ServiceError::from_db)?;
        if res.rows_affected == 0 {
            return match self.find(selection.service_id, selection.configuration_version).await? {
                Some(current) => Err(ServiceError::StaleRevision(format!(
                    "selection revision {} is behind stored revision {}",
                    expected, current.revision
                ))),
                None => Err(ServiceError::not_found("selection")),
            };
        }
        selection.revision = expected + 1;
        selection.updated_at = now;
        Ok(selection)
    }
}
