use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use models::service_configuration::validate_option_types;

use super::domain::{OptionType, ReplaceConfigurationInput, ServiceConfiguration};
use super::repository::ConfigurationRepository;
use crate::catalog::CatalogRepository;
use crate::errors::ServiceError;
use crate::metrics;

/// Configuration Manager. Owns option type validation and the version bump policy.
pub struct ConfigurationService {
    configs: Arc<dyn ConfigurationRepository>,
    catalog: Arc<dyn CatalogRepository>,
}

impl ConfigurationService {
    pub fn new(configs: Arc<dyn ConfigurationRepository>, catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { configs, catalog }
    }

    #[instrument(skip(self), fields(service_id = %service_id))]
    pub async fn get(&self, service_id: Uuid) -> Result<ServiceConfiguration, ServiceError> {
        self.require(service_id).await
    }

    /// Create the configuration at version 1, or replace the option types of an existing one.
    ///
    /// The version advances only when the option type sequence differs structurally;
    /// selection rules are replaced when supplied and preserved otherwise.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::catalog::repository::mock::MockCatalogRepository;
    /// use service::configuration::repository::mock::MockConfigurationRepository;
    /// use service::configuration::domain::{OptionType, ReplaceConfigurationInput};
    /// use service::configuration::ConfigurationService;
    /// let catalog = Arc::new(MockCatalogRepository::default());
    /// let service_id = tokio_test::block_on(catalog.add_service("Wedding Buffet"));
    /// let svc = ConfigurationService::new(Arc::new(MockConfigurationRepository::default()), catalog);
    /// let input = ReplaceConfigurationInput { option_types: vec![OptionType::new("starters", "Starters")], selection_rules: None };
    /// let cfg = tokio_test::block_on(svc.create_or_replace(service_id, input)).unwrap();
    /// assert_eq!(cfg.version, 1);
    /// ```
    #[instrument(skip(self, input), fields(service_id = %service_id, option_types = input.option_types.len()))]
    pub async fn create_or_replace(&self, service_id: Uuid, input: ReplaceConfigurationInput) -> Result<ServiceConfiguration, ServiceError> {
        if !self.catalog.service_exists(service_id).await? {
            return Err(ServiceError::not_found("service"));
        }
        validate_option_types(&input.option_types)?;

        let Some(mut cfg) = self.configs.find_by_service(service_id).await? else {
            let cfg = ServiceConfiguration::new(
                service_id,
                input.option_types,
                input.selection_rules.unwrap_or_default(),
                Utc::now(),
            );
            let created = self.configs.create(cfg).await?;
            metrics::CONFIGURATION_WRITES_TOTAL.inc();
            info!(configuration_id = %created.id, version = created.version, "configuration_created");
            return Ok(created);
        };

        let structural = cfg.option_types != input.option_types;
        if structural {
            cfg.option_types = input.option_types;
            cfg.version += 1;
        }
        if let Some(rules) = input.selection_rules {
            cfg.selection_rules = rules;
        }
        self.persist(cfg, structural).await
    }

    /// Append one option type; always a structural change.
    #[instrument(skip(self, option_type), fields(service_id = %service_id, key = %option_type.key))]
    pub async fn add_option_type(&self, service_id: Uuid, option_type: OptionType) -> Result<ServiceConfiguration, ServiceError> {
        option_type.validate()?;
        let mut cfg = self.require(service_id).await?;
        if cfg.has_key(&option_type.key) {
            return Err(ServiceError::Validation(format!("option type key already exists: {}", option_type.key)));
        }
        cfg.option_types.push(option_type);
        cfg.version += 1;
        self.persist(cfg, true).await
    }

    #[instrument(skip(self), fields(service_id = %service_id))]
    pub async fn remove_option_type(&self, service_id: Uuid, key: &str) -> Result<ServiceConfiguration, ServiceError> {
        let mut cfg = self.require(service_id).await?;
        let Some(pos) = cfg.option_types.iter().position(|ot| ot.key == key) else {
            return Err(ServiceError::NotFound(format!("option type not found: {key}")));
        };
        cfg.option_types.remove(pos);
        cfg.version += 1;
        self.persist(cfg, true).await
    }

    /// Rewrite `displayOrder` to each key's position in `ordered_keys`.
    ///
    /// Option types whose key is not listed are dropped, and the version is left as is.
    #[instrument(skip(self, ordered_keys), fields(service_id = %service_id, keys = ordered_keys.len()))]
    pub async fn reorder_option_types(&self, service_id: Uuid, ordered_keys: &[String]) -> Result<ServiceConfiguration, ServiceError> {
        let mut cfg = self.require(service_id).await?;

        let mut seen = HashSet::with_capacity(ordered_keys.len());
        for key in ordered_keys {
            if !cfg.has_key(key) {
                return Err(ServiceError::Validation(format!("invalid option type key: {key}")));
            }
            if !seen.insert(key.as_str()) {
                return Err(ServiceError::Validation(format!("duplicate option type key: {key}")));
            }
        }

        let mut reordered = Vec::with_capacity(ordered_keys.len());
        for (index, key) in ordered_keys.iter().enumerate() {
            if let Some(mut ot) = cfg.option_types.iter().find(|ot| &ot.key == key).cloned() {
                ot.display_order = index as i32;
                reordered.push(ot);
            }
        }
        let dropped = cfg.option_types.len() - reordered.len();
        if dropped > 0 {
            debug!(dropped, "unlisted option types dropped by reorder");
        }
        cfg.option_types = reordered;
        self.persist(cfg, false).await
    }

    async fn require(&self, service_id: Uuid) -> Result<ServiceConfiguration, ServiceError> {
        self.configs
            .find_by_service(service_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("service configuration"))
    }

    async fn persist(&self, cfg: ServiceConfiguration, bumped: bool) -> Result<ServiceConfiguration, ServiceError> {
        let saved = match self.configs.save(cfg).await {
            Ok(saved) => saved,
            Err(e @ ServiceError::StaleRevision(_)) => {
                metrics::STALE_REVISIONS_TOTAL.inc();
                warn!(error = %e, "configuration write lost a revision race");
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        metrics::CONFIGURATION_WRITES_TOTAL.inc();
        if bumped {
            metrics::CONFIGURATION_VERSION_BUMPS_TOTAL.inc();
            info!(configuration_id = %saved.id, version = saved.version, "configuration_version_bumped");
        } else {
            debug!(configuration_id = %saved.id, version = saved.version, "configuration_saved");
        }
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::domain::{OptionCategory, SelectionRules};
    use crate::test_support::Fixture;

    fn starters_only() -> ReplaceConfigurationInput {
        ReplaceConfigurationInput { option_types: vec![OptionType::new("starters", "Starters")], selection_rules: None }
    }

    #[tokio::test]
    async fn create_starts_at_version_one_with_default_rules() -> anyhow::Result<()> {
        let fx = Fixture::new();
        let sid = fx.service("Wedding Buffet").await;

        let cfg = fx.configurations.create_or_replace(sid, starters_only()).await?;
        assert_eq!(cfg.version, 1);
        assert!(cfg.is_active);
        assert_eq!(cfg.selection_rules, SelectionRules::default());
        assert_eq!(fx.configurations.get(sid).await?.id, cfg.id);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_service_is_not_found() {
        let fx = Fixture::new();
        let err = fx.configurations.create_or_replace(Uuid::new_v4(), starters_only()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)), "{err}");
        let err = fx.configurations.get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)), "{err}");
    }

    #[tokio::test]
    async fn empty_and_duplicate_option_types_rejected() {
        let fx = Fixture::new();
        let sid = fx.service("Corporate Lunch").await;

        let empty = ReplaceConfigurationInput { option_types: vec![], selection_rules: None };
        let err = fx.configurations.create_or_replace(sid, empty).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let dup = ReplaceConfigurationInput {
            option_types: vec![OptionType::new("decor", "Decor"), OptionType::new("decor", "Decor again")],
            selection_rules: None,
        };
        let err = fx.configurations.create_or_replace(sid, dup).await.unwrap_err();
        assert!(err.to_string().contains("duplicate option type key: decor"), "{err}");
        assert!(fx.configurations.get(sid).await.is_err(), "nothing persisted");
    }

    #[tokio::test]
    async fn replace_bumps_only_on_structural_change() -> anyhow::Result<()> {
        let fx = Fixture::new();
        let sid = fx.service("Birthday Party").await;
        fx.configurations.create_or_replace(sid, starters_only()).await?;

        // identical sequence, new rules: no bump
        let rules = SelectionRules { allow_mixed_categories: false, require_minimum_selection: true };
        let same = ReplaceConfigurationInput { option_types: vec![OptionType::new("starters", "Starters")], selection_rules: Some(rules) };
        let cfg = fx.configurations.create_or_replace(sid, same).await?;
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.selection_rules, rules);

        // changed category: bump, rules preserved when omitted
        let mut starters = OptionType::new("starters", "Starters");
        starters.category = OptionCategory::Premium;
        let changed = ReplaceConfigurationInput { option_types: vec![starters], selection_rules: None };
        let cfg = fx.configurations.create_or_replace(sid, changed).await?;
        assert_eq!(cfg.version, 2);
        assert_eq!(cfg.selection_rules, rules);
        Ok(())
    }

    #[tokio::test]
    async fn add_option_type_appends_and_bumps() -> anyhow::Result<()> {
        let fx = Fixture::new();
        let sid = fx.service("Reception").await;
        fx.configurations.create_or_replace(sid, starters_only()).await?;

        let cfg = fx.configurations.add_option_type(sid, OptionType::new("decor", "Decor")).await?;
        assert_eq!(cfg.option_types.len(), 2);
        assert_eq!(cfg.version, 2);
        assert_eq!(cfg.option_types[1].key, "decor");

        let err = fx.configurations.add_option_type(sid, OptionType::new("decor", "Decor")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        let err = fx.configurations.add_option_type(sid, OptionType::new("music", "")).await.unwrap_err();
        assert!(err.to_string().contains("label"), "{err}");
        assert_eq!(fx.configurations.get(sid).await?.version, 2);
        Ok(())
    }

    #[tokio::test]
    async fn remove_option_type_bumps_and_reports_missing_key() -> anyhow::Result<()> {
        let fx = Fixture::new();
        let sid = fx.service("Gala Dinner").await;
        fx.configurations.create_or_replace(sid, starters_only()).await?;
        fx.configurations.add_option_type(sid, OptionType::new("decor", "Decor")).await?;

        let cfg = fx.configurations.remove_option_type(sid, "starters").await?;
        assert_eq!(cfg.keys().into_iter().collect::<Vec<_>>(), vec!["decor"]);
        assert_eq!(cfg.version, 3);

        let err = fx.configurations.remove_option_type(sid, "starters").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        Ok(())
    }

    #[tokio::test]
    async fn reorder_drops_unlisted_keys_without_bump() -> anyhow::Result<()> {
        let fx = Fixture::new();
        let sid = fx.service("Engagement").await;
        fx.configurations.create_or_replace(sid, starters_only()).await?;
        fx.configurations.add_option_type(sid, OptionType::new("decor", "Decor")).await?;

        let cfg = fx.configurations.reorder_option_types(sid, &["decor".to_string()]).await?;
        assert_eq!(cfg.option_types.len(), 1);
        assert_eq!(cfg.option_types[0].key, "decor");
        assert_eq!(cfg.option_types[0].display_order, 0);
        assert_eq!(cfg.version, 2);
        Ok(())
    }

    #[tokio::test]
    async fn reorder_rewrites_display_order() -> anyhow::Result<()> {
        let fx = Fixture::new();
        let sid = fx.service("Anniversary").await;
        fx.configurations.create_or_replace(sid, starters_only()).await?;
        fx.configurations.add_option_type(sid, OptionType::new("decor", "Decor")).await?;

        let cfg = fx.configurations.reorder_option_types(sid, &["decor".into(), "starters".into()]).await?;
        let order: Vec<_> = cfg.option_types.iter().map(|ot| (ot.key.as_str(), ot.display_order)).collect();
        assert_eq!(order, vec![("decor", 0), ("starters", 1)]);

        let err = fx.configurations.reorder_option_types(sid, &["music".into()]).await.unwrap_err();
        assert!(err.to_string().contains("music"), "{err}");
        let err = fx.configurations.reorder_option_types(sid, &["decor".into(), "decor".into()]).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        Ok(())
    }
}
