use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::domain::{
    actor_label, ChangeEvent, HistoryChanges, HistoryEntry, OptionChange, OptionMetadata, OptionState, SaveSelectionInput,
    SelectionItem, SelectionItemInput, SelectionView, ServiceSelection, SlotAction, UpdateOptionInput, MIGRATION_ACTOR,
};
use super::repository::SelectionRepository;
use crate::catalog::CatalogRepository;
use crate::configuration::domain::ServiceConfiguration;
use crate::configuration::repository::ConfigurationRepository;
use crate::errors::ServiceError;
use crate::metrics;
use models::service_selection::Actor;

/// Selection Manager. Always resolves the current configuration version before touching selections.
pub struct SelectionService {
    configs: Arc<dyn ConfigurationRepository>,
    selections: Arc<dyn SelectionRepository>,
    catalog: Arc<dyn CatalogRepository>,
}

impl SelectionService {
    pub fn new(
        configs: Arc<dyn ConfigurationRepository>,
        selections: Arc<dyn SelectionRepository>,
        catalog: Arc<dyn CatalogRepository>,
    ) -> Self {
        Self { configs, selections, catalog }
    }

    /// Selection at the current configuration version, creating an empty default on first read.
    #[instrument(skip(self), fields(service_id = %service_id))]
    pub async fn get_selection(&self, service_id: Uuid) -> Result<SelectionView, ServiceError> {
        let cfg = self.current_configuration(service_id).await?;
        let selection = match self.selections.find(service_id, cfg.version).await? {
            Some(s) => s,
            None => self.create_default(&cfg).await?,
        };
        self.resolve(selection).await
    }

    async fn create_default(&self, cfg: &ServiceConfiguration) -> Result<ServiceSelection, ServiceError> {
        let now = Utc::now();
        let system = Actor::System.as_str();
        let mut selection = ServiceSelection::new(cfg.service_id, cfg.version, now);
        selection.options = cfg.option_types.iter().map(|ot| OptionState::empty(ot.key.clone(), system, now)).collect();
        selection.history.push(HistoryEntry {
            timestamp: now,
            changes: HistoryChanges::Event(ChangeEvent::Created { version: cfg.version }),
            changed_by: system.to_string(),
        });
        match self.selections.create(selection).await {
            Ok(created) => {
                metrics::SELECTION_DEFAULTS_TOTAL.inc();
                info!(selection_id = %created.id, version = cfg.version, "selection_default_created");
                Ok(created)
            }
            // a concurrent reader created it first
            Err(ServiceError::Conflict(_)) => self
                .selections
                .find(cfg.service_id, cfg.version)
                .await?
                .ok_or_else(|| ServiceError::not_found("selection")),
            Err(e) => Err(e),
        }
    }

    /// Replace or append the given option slots, recording one grouped history entry.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::catalog::repository::mock::MockCatalogRepository;
    /// use service::configuration::{ConfigurationService, repository::mock::MockConfigurationRepository};
    /// use service::configuration::domain::{OptionType, ReplaceConfigurationInput};
    /// use service::selection::{SelectionService, repository::mock::MockSelectionRepository};
    /// use service::selection::domain::{OptionStateInput, SaveSelectionInput, SelectionItemInput};
    /// let catalog = Arc::new(MockCatalogRepository::default());
    /// let configs = Arc::new(MockConfigurationRepository::default());
    /// let service_id = tokio_test::block_on(catalog.add_service("Wedding Buffet"));
    /// let paneer = tokio_test::block_on(catalog.add_menu_item("Paneer Tikka"));
    /// let cfg_svc = ConfigurationService::new(configs.clone(), catalog.clone());
    /// let input = ReplaceConfigurationInput { option_types: vec![OptionType::new("starters", "Starters")], selection_rules: None };
    /// tokio_test::block_on(cfg_svc.create_or_replace(service_id, input)).unwrap();
    /// let svc = SelectionService::new(configs, Arc::new(MockSelectionRepository::default()), catalog);
    /// let save = SaveSelectionInput {
    ///     options: vec![OptionStateInput { option_key: "starters".into(), selected: vec![SelectionItemInput::new(paneer)], unselected: vec![] }],
    ///     changed_by: "admin".into(),
    /// };
    /// let view = tokio_test::block_on(svc.save_selection(service_id, save)).unwrap();
    /// assert_eq!(view.options[0].selected.len(), 1);
    /// ```
    #[instrument(skip(self, input), fields(service_id = %service_id, options = input.options.len(), changed_by = %input.changed_by))]
    pub async fn save_selection(&self, service_id: Uuid, input: SaveSelectionInput) -> Result<SelectionView, ServiceError> {
        let cfg = self.current_configuration(service_id).await?;

        let valid_keys = cfg.keys();
        if let Some(bad) = input.options.iter().find(|o| !valid_keys.contains(o.option_key.as_str())) {
            return Err(ServiceError::Validation(format!("invalid option key: {}", bad.option_key)));
        }
        let mut seen = HashSet::new();
        let ids: Vec<Uuid> = input.options.iter().flat_map(|o| o.item_ids()).filter(|id| seen.insert(*id)).collect();
        self.ensure_items_exist(&ids).await?;

        let existing = self.selections.find(service_id, cfg.version).await?;
        let is_new = existing.is_none();
        let mut selection = existing.unwrap_or_else(|| ServiceSelection::new(service_id, cfg.version, Utc::now()));

        let now = Utc::now();
        let changed_by = actor_label(&input.changed_by).to_string();
        let added_by = Actor::from_label(&changed_by).unwrap_or_default();
        let mut changes = Vec::with_capacity(input.options.len());
        for option in input.options {
            let state = OptionState {
                selected: option.selected.into_iter().map(|i| i.into_item(now, added_by)).collect(),
                unselected: option.unselected.into_iter().map(|i| i.into_item(now, added_by)).collect(),
                metadata: OptionMetadata { last_modified: Some(now), modified_by: Some(changed_by.clone()) },
                option_key: option.option_key,
            };
            match selection.options.iter_mut().find(|o| o.option_key == state.option_key) {
                Some(slot) => {
                    changes.push(OptionChange::Replaced {
                        option_key: state.option_key.clone(),
                        selected_before: slot.selected.len(),
                        selected_after: state.selected.len(),
                        unselected_before: slot.unselected.len(),
                        unselected_after: state.unselected.len(),
                    });
                    *slot = state;
                }
                None => {
                    changes.push(OptionChange::Created {
                        option_key: state.option_key.clone(),
                        action: SlotAction::Created,
                        selected_count: state.selected.len(),
                        unselected_count: state.unselected.len(),
                    });
                    selection.options.push(state);
                }
            }
        }
        selection.history.push(HistoryEntry {
            timestamp: now,
            changes: HistoryChanges::Batch(changes),
            changed_by,
        });

        let saved = if is_new { self.selections.create(selection).await? } else { self.persist(selection).await? };
        metrics::SELECTION_WRITES_TOTAL.inc();
        info!(selection_id = %saved.id, version = saved.configuration_version, created = is_new, "selection_saved");
        self.resolve(saved).await
    }

    /// Replace one existing option slot wholesale.
    #[instrument(skip(self, input), fields(service_id = %service_id, option_key = %option_key, changed_by = %input.changed_by))]
    pub async fn update_option(&self, service_id: Uuid, option_key: &str, input: UpdateOptionInput) -> Result<SelectionView, ServiceError> {
        let mut selection = self.current_selection(service_id).await?;
        let Some(index) = selection.options.iter().position(|o| o.option_key == option_key) else {
            return Err(ServiceError::NotFound(format!("option not found in selection: {option_key}")));
        };

        let mut seen = HashSet::new();
        let ids: Vec<Uuid> = input
            .selected
            .iter()
            .chain(input.unselected.iter())
            .map(|i| i.item_id)
            .filter(|id| seen.insert(*id))
            .collect();
        self.ensure_items_exist(&ids).await?;

        let now = Utc::now();
        let changed_by = actor_label(&input.changed_by).to_string();
        let added_by = Actor::from_label(&changed_by).unwrap_or_default();
        let to_items = |list: Vec<SelectionItemInput>| -> Vec<SelectionItem> { list.into_iter().map(|i| i.into_item(now, added_by)).collect() };
        selection.options[index] = OptionState {
            option_key: option_key.to_string(),
            selected: to_items(input.selected),
            unselected: to_items(input.unselected),
            metadata: OptionMetadata { last_modified: Some(now), modified_by: Some(changed_by.clone()) },
        };
        selection.history.push(HistoryEntry {
            timestamp: now,
            changes: HistoryChanges::Event(ChangeEvent::Updated { option_key: option_key.to_string() }),
            changed_by,
        });

        let saved = self.persist(selection).await?;
        metrics::SELECTION_WRITES_TOTAL.inc();
        info!(selection_id = %saved.id, "selection_option_updated");
        self.resolve(saved).await
    }

    /// Up to `limit` history entries of the latest selection, most recent first.
    #[instrument(skip(self), fields(service_id = %service_id))]
    pub async fn history(&self, service_id: Uuid, limit: usize) -> Result<Vec<HistoryEntry>, ServiceError> {
        let selection = self.latest(service_id).await?;
        let mut entries = selection.history;
        // newest append wins ties on equal timestamps
        entries.reverse();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(limit);
        Ok(entries)
    }

    /// Stamp the advisory lock on the current version's selection; fails if it is already held.
    ///
    /// A selection left behind by a version bump stays frozen until it is migrated.
    #[instrument(skip(self), fields(service_id = %service_id))]
    pub async fn lock(&self, service_id: Uuid, locked_by: &str) -> Result<ServiceSelection, ServiceError> {
        let mut selection = self.current_selection(service_id).await?;
        if selection.is_locked {
            metrics::LOCK_CONFLICTS_TOTAL.inc();
            debug!(locked_by = ?selection.locked_by, "selection already locked");
            return Err(ServiceError::Locked { locked_by: selection.locked_by, locked_at: selection.locked_at });
        }
        let locked_by = if locked_by.trim().is_empty() { Actor::Admin.as_str() } else { locked_by.trim() };
        selection.is_locked = true;
        selection.locked_at = Some(Utc::now());
        selection.locked_by = Some(locked_by.to_string());
        let saved = self.persist(selection).await?;
        info!(selection_id = %saved.id, locked_by, "selection_locked");
        Ok(saved)
    }

    /// Clear the lock fields of the current version's selection. Idempotent.
    #[instrument(skip(self), fields(service_id = %service_id))]
    pub async fn unlock(&self, service_id: Uuid) -> Result<ServiceSelection, ServiceError> {
        let mut selection = self.current_selection(service_id).await?;
        selection.is_locked = false;
        selection.locked_at = None;
        selection.locked_by = None;
        let saved = self.persist(selection).await?;
        info!(selection_id = %saved.id, "selection_unlocked");
        Ok(saved)
    }

    /// Create the selection for the current version from the latest prior one,
    /// keeping only option slots whose key survives in the current schema.
    #[instrument(skip(self), fields(service_id = %service_id))]
    pub async fn migrate(&self, service_id: Uuid) -> Result<SelectionView, ServiceError> {
        let cfg = self.current_configuration(service_id).await?;
        let previous = self
            .selections
            .find_latest(service_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("no previous selection found".into()))?;
        if self.selections.find(service_id, cfg.version).await?.is_some() {
            return Err(ServiceError::Conflict(format!("selection for version {} already exists", cfg.version)));
        }

        let now = Utc::now();
        let keys = cfg.keys();
        let mut selection = ServiceSelection::new(service_id, cfg.version, now);
        selection.options = previous
            .options
            .into_iter()
            .filter(|o| keys.contains(o.option_key.as_str()))
            .map(|o| OptionState {
                metadata: OptionMetadata { last_modified: Some(now), modified_by: Some(MIGRATION_ACTOR.to_string()) },
                ..o
            })
            .collect();
        selection.history.push(HistoryEntry {
            timestamp: now,
            changes: HistoryChanges::Event(ChangeEvent::Migrated {
                from_version: previous.configuration_version,
                to_version: cfg.version,
            }),
            changed_by: Actor::System.as_str().to_string(),
        });

        let created = self.selections.create(selection).await?;
        metrics::SELECTION_MIGRATIONS_TOTAL.inc();
        info!(
            selection_id = %created.id,
            from_version = previous.configuration_version,
            to_version = cfg.version,
            carried = created.options.len(),
            "selection_migrated"
        );
        self.resolve(created).await
    }

    async fn current_configuration(&self, service_id: Uuid) -> Result<ServiceConfiguration, ServiceError> {
        self.configs
            .find_by_service(service_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("service configuration"))
    }

    async fn current_selection(&self, service_id: Uuid) -> Result<ServiceSelection, ServiceError> {
        let cfg = self.current_configuration(service_id).await?;
        self.selections
            .find(service_id, cfg.version)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("no selection for configuration version {}", cfg.version)))
    }

    async fn latest(&self, service_id: Uuid) -> Result<ServiceSelection, ServiceError> {
        self.selections
            .find_latest(service_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("selection"))
    }

    async fn ensure_items_exist(&self, ids: &[Uuid]) -> Result<(), ServiceError> {
        if ids.is_empty() {
            return Ok(());
        }
        let found: HashSet<Uuid> = self.catalog.find_menu_items(ids).await?.into_iter().map(|i| i.id).collect();
        match ids.iter().find(|id| !found.contains(*id)) {
            Some(missing) => Err(ServiceError::Validation(format!("invalid menu item id: {missing}"))),
            None => Ok(()),
        }
    }

    async fn persist(&self, selection: ServiceSelection) -> Result<ServiceSelection, ServiceError> {
        match self.selections.save(selection).await {
            Err(e @ ServiceError::StaleRevision(_)) => {
                metrics::STALE_REVISIONS_TOTAL.inc();
                warn!(error = %e, "selection write lost a revision race");
                Err(e)
            }
            other => other,
        }
    }

    async fn resolve(&self, selection: ServiceSelection) -> Result<SelectionView, ServiceError> {
        let ids = selection.item_ids();
        let items: HashMap<_, _> = if ids.is_empty() {
            HashMap::new()
        } else {
            self.catalog.find_menu_items(&ids).await?.into_iter().map(|i| (i.id, i)).collect()
        };
        Ok(SelectionView::resolve(selection, &items))
    }
}
