use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use models::service_configuration::{self, OptionTypes};

use crate::configuration::domain::ServiceConfiguration;
use crate::configuration::repository::ConfigurationRepository;
use crate::errors::ServiceError;

pub struct SeaOrmConfigurationRepository {
    pub db: DatabaseConnection,
}

#[async_trait::async_trait]
impl ConfigurationRepository for SeaOrmConfigurationRepository {
    async fn find_by_service(&self, service_id: Uuid) -> Result<Option<ServiceConfiguration>, ServiceError> {
        let res = service_configuration::Entity::find()
            .filter(service_configuration::Column::ServiceId.eq(service_id))
            .one(&self.db)
            .await
            .map_err(ServiceError::from_db)?;
        Ok(res.map(ServiceConfiguration::from))
    }

    async fn create(&self, config: ServiceConfiguration) -> Result<ServiceConfiguration, ServiceError> {
        let am = service_configuration::ActiveModel {
            id: Set(config.id),
            service_id: Set(config.service_id),
            option_types: Set(OptionTypes(config.option_types)),
            selection_rules: Set(config.selection_rules),
            version: Set(config.version),
            is_active: Set(config.is_active),
            revision: Set(config.revision),
            created_at: Set(config.created_at.into()),
            updated_at: Set(config.updated_at.into()),
        };
        let created = am.insert(&self.db).await.map_err(ServiceError::from_db)?;
        Ok(created.into())
    }

    async fn save(&self, mut config: ServiceConfiguration) -> Result<ServiceConfiguration, ServiceError> {
        let expected = config.revision;
        let now = Utc::now();
        let changes = service_configuration::ActiveModel {
            option_types: Set(OptionTypes(config.option_types.clone())),
            selection_rules: Set(config.selection_rules),
            version: Set(config.version),
            is_active: Set(config.is_active),
            revision: Set(expected + 1),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        let res = service_configuration::Entity::update_many()
            .set(changes)
            .filter(service_configuration::Column::Id.eq(config.id))
            .filter(service_configuration::Column::Revision.eq(expected))
            .exec(&self.db)
            .await
            .map_err(ServiceError::from_db)?;
        if res.rows_affected == 0 {
            return match self.find_by_service(config.service_id).await? {
                Some(current) => Err(ServiceError::StaleRevision(format!(
                    "configuration revision {} is behind stored revision {}",
                    expected, current.revision
                ))),
                None => Err(ServiceError::not_found("service configuration")),
            };
        }
        config.revision = expected + 1;
        config.updated_at = now;
        Ok(config)
    }
}
