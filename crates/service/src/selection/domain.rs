use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::domain::MenuItem;

pub use models::service_selection::{
    Actor, ChangeEvent, HistoryChanges, HistoryEntry, OptionChange, OptionMetadata, OptionState, SelectionItem,
    SlotAction, MIGRATION_ACTOR,
};

/// Stored selection for one (service, configuration version) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSelection {
    pub id: Uuid,
    #[serde(rename = "service")]
    pub service_id: Uuid,
    pub configuration_version: i32,
    pub options: Vec<OptionState>,
    pub history: Vec<HistoryEntry>,
    pub is_locked: bool,
    pub locked_at: Option<DateTime<Utc>>,
    pub locked_by: Option<String>,
    pub revision: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceSelection {
    pub fn new(service_id: Uuid, configuration_version: i32, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            service_id,
            configuration_version,
            options: Vec::new(),
            history: Vec::new(),
            is_locked: false,
            locked_at: None,
            locked_by: None,
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn option(&self, key: &str) -> Option<&OptionState> {
        self.options.iter().find(|o| o.option_key == key)
    }

    /// Every referenced catalog item id, first occurrence order, without duplicates.
    pub fn item_ids(&self) -> Vec<Uuid> {
        let mut seen = HashSet::new();
        self.options.iter().flat_map(|o| o.item_ids()).filter(|id| seen.insert(*id)).collect()
    }
}

impl From<models::service_selection::Model> for ServiceSelection {
    fn from(m: models::service_selection::Model) -> Self {
        Self {
            id: m.id,
            service_id: m.service_id,
            configuration_version: m.configuration_version,
            options: m.options.0,
            history: m.history.0,
            is_locked: m.is_locked,
            locked_at: m.locked_at.map(|t| t.with_timezone(&Utc)),
            locked_by: m.locked_by,
            revision: m.revision,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        }
    }
}

/// A selection item with its catalog record attached; `item` is null when the record is gone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedItem {
    pub item_id: Uuid,
    pub item: Option<MenuItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<serde_json::Value>,
    pub added_at: DateTime<Utc>,
    pub added_by: Actor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedOptionState {
    pub option_key: String,
    pub selected: Vec<ResolvedItem>,
    pub unselected: Vec<ResolvedItem>,
    pub metadata: OptionMetadata,
}

/// Selection as returned to clients, item references resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionView {
    pub id: Uuid,
    #[serde(rename = "service")]
    pub service_id: Uuid,
    pub configuration_version: i32,
    pub options: Vec<ResolvedOptionState>,
    pub history: Vec<HistoryEntry>,
    pub is_locked: bool,
    pub locked_at: Option<DateTime<Utc>>,
    pub locked_by: Option<String>,
    pub revision: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SelectionView {
    pub fn resolve(selection: ServiceSelection, items: &HashMap<Uuid, MenuItem>) -> Self {
        let resolve_all = |list: Vec<SelectionItem>| -> Vec<ResolvedItem> {
            list.into_iter()
                .map(|i| ResolvedItem {
                    item_id: i.item_id,
                    item: items.get(&i.item_id).cloned(),
                    custom_data: i.custom_data,
                    added_at: i.added_at,
                    added_by: i.added_by,
                })
                .collect()
        };
        let options = selection
            .options
            .into_iter()
            .map(|o| ResolvedOptionState {
                option_key: o.option_key,
                selected: resolve_all(o.selected),
                unselected: resolve_all(o.unselected),
                metadata: o.metadata,
            })
            .collect();
        Self {
            id: selection.id,
            service_id: selection.service_id,
            configuration_version: selection.configuration_version,
            options,
            history: selection.history,
            is_locked: selection.is_locked,
            locked_at: selection.locked_at,
            locked_by: selection.locked_by,
            revision: selection.revision,
            created_at: selection.created_at,
            updated_at: selection.updated_at,
        }
    }
}

/// Incoming selection item; `addedAt`/`addedBy` fall back to the write's time and actor.
/// A `changedBy` label outside the known actors falls back to `admin` for `addedBy`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionItemInput {
    pub item_id: Uuid,
    #[serde(default)]
    pub custom_data: Option<serde_json::Value>,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub added_by: Option<Actor>,
}

impl SelectionItemInput {
    pub fn new(item_id: Uuid) -> Self {
        Self { item_id, custom_data: None, added_at: None, added_by: None }
    }

    pub fn into_item(self, now: DateTime<Utc>, default_added_by: Actor) -> SelectionItem {
        SelectionItem {
            item_id: self.item_id,
            custom_data: self.custom_data,
            added_at: self.added_at.unwrap_or(now),
            added_by: self.added_by.unwrap_or(default_added_by),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionStateInput {
    pub option_key: String,
    #[serde(default)]
    pub selected: Vec<SelectionItemInput>,
    #[serde(default)]
    pub unselected: Vec<SelectionItemInput>,
}

impl OptionStateInput {
    pub fn item_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.selected.iter().chain(self.unselected.iter()).map(|i| i.item_id)
    }
}

/// Body of `PUT /selections/{serviceId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSelectionInput {
    pub options: Vec<OptionStateInput>,
    /// Free-form actor label written to history; defaults to `admin`.
    #[serde(default = "default_actor")]
    pub changed_by: String,
}

/// Body of `POST /selections/{serviceId}/option/{optionKey}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOptionInput {
    #[serde(default)]
    pub selected: Vec<SelectionItemInput>,
    #[serde(default)]
    pub unselected: Vec<SelectionItemInput>,
    #[serde(default = "default_actor")]
    pub changed_by: String,
}

impl Default for UpdateOptionInput {
    fn default() -> Self {
        Self { selected: Vec::new(), unselected: Vec::new(), changed_by: default_actor() }
    }
}

/// Body of `PATCH /selections/{serviceId}/lock`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockInput {
    #[serde(default = "default_actor")]
    pub locked_by: String,
}

impl Default for LockInput {
    fn default() -> Self { Self { locked_by: default_actor() } }
}

fn default_actor() -> String { Actor::Admin.as_str().to_string() }

/// Trimmed actor label, `admin` when blank.
pub fn actor_label(raw: &str) -> &str {
    match raw.trim() {
        "" => Actor::Admin.as_str(),
        label => label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_input_defaults_to_write_time_and_actor() {
        let now = Utc::now();
        let item = SelectionItemInput::new(Uuid::nil()).into_item(now, Actor::Customer);
        assert_eq!(item.added_at, now);
        assert_eq!(item.added_by, Actor::Customer);
    }

    #[test]
    fn save_input_defaults_changed_by_admin() {
        let input: SaveSelectionInput = serde_json::from_value(json!({
            "options": [{"optionKey": "starters", "selected": [{"itemId": Uuid::nil()}]}]
        }))
        .unwrap();
        assert_eq!(input.changed_by, "admin");
        assert!(input.options[0].unselected.is_empty());
    }

    #[test]
    fn changed_by_accepts_free_form_labels() {
        let input: UpdateOptionInput = serde_json::from_value(json!({"changedBy": "planner@venue"})).unwrap();
        assert_eq!(input.changed_by, "planner@venue");
        assert_eq!(UpdateOptionInput::default().changed_by, "admin");
        assert_eq!(actor_label("  "), "admin");
        assert_eq!(actor_label(" planner@venue "), "planner@venue");
    }

    #[test]
    fn lock_input_defaults_locked_by() {
        let input: LockInput = serde_json::from_value(json!({})).unwrap();
        assert_eq!(input.locked_by, "admin");
    }

    #[test]
    fn missing_catalog_record_resolves_to_null() {
        let mut sel = ServiceSelection::new(Uuid::new_v4(), 1, Utc::now());
        let mut state = OptionState::empty("starters", "admin", Utc::now());
        state.selected.push(SelectionItemInput::new(Uuid::new_v4()).into_item(Utc::now(), Actor::Admin));
        sel.options.push(state);

        let view = SelectionView::resolve(sel, &HashMap::new());
        let wire = serde_json::to_value(&view).unwrap();
        assert!(wire["options"][0]["selected"][0]["item"].is_null());
        assert!(wire["options"][0]["selected"][0]["itemId"].is_string());
        assert!(wire["service"].is_string());
    }

    #[test]
    fn item_ids_are_deduplicated() {
        let id = Uuid::new_v4();
        let mut sel = ServiceSelection::new(Uuid::new_v4(), 1, Utc::now());
        for key in ["starters", "mains"] {
            let mut state = OptionState::empty(key, "admin", Utc::now());
            state.selected.push(SelectionItemInput::new(id).into_item(Utc::now(), Actor::Admin));
            sel.options.push(state);
        }
        assert_eq!(sel.item_ids(), vec![id]);
    }
}
