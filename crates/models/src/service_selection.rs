use std::fmt;

use chrono::{DateTime, Utc};
use sea_orm::{entity::prelude::*, FromJsonQueryResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::service;

/// Who added an item or made a change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actor {
    #[default]
    Admin,
    Customer,
    System,
}

impl Actor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Actor::Admin => "admin",
            Actor::Customer => "customer",
            Actor::System => "system",
        }
    }

    /// Match a free-form actor label against the known actors, ignoring case.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Actor::Admin),
            "customer" => Some(Actor::Customer),
            "system" => Some(Actor::System),
            _ => None,
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// `metadata.modifiedBy` stamped on option states carried over by a migration.
pub const MIGRATION_ACTOR: &str = "system-migration";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionItem {
    pub item_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<serde_json::Value>,
    pub added_at: DateTime<Utc>,
    #[serde(default)]
    pub added_by: Actor,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionMetadata {
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_by: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionState {
    pub option_key: String,
    #[serde(default)]
    pub selected: Vec<SelectionItem>,
    #[serde(default)]
    pub unselected: Vec<SelectionItem>,
    #[serde(default)]
    pub metadata: OptionMetadata,
}

impl OptionState {
    /// Empty slot for `option_key`, stamped as modified now by `modified_by`.
    pub fn empty(option_key: impl Into<String>, modified_by: &str, now: DateTime<Utc>) -> Self {
        Self {
            option_key: option_key.into(),
            selected: Vec::new(),
            unselected: Vec::new(),
            metadata: OptionMetadata { last_modified: Some(now), modified_by: Some(modified_by.to_string()) },
        }
    }

    pub fn item_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.selected.iter().chain(self.unselected.iter()).map(|i| i.item_id)
    }
}

/// Marker serialized as `"action": "created"` inside a batch change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotAction {
    Created,
}

/// Per-option diff recorded by a full selection save.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum OptionChange {
    /// Slot did not exist before the save.
    Created {
        option_key: String,
        action: SlotAction,
        selected_count: usize,
        unselected_count: usize,
    },
    /// Slot replaced in place.
    Replaced {
        option_key: String,
        selected_before: usize,
        selected_after: usize,
        unselected_before: usize,
        unselected_after: usize,
    },
}

impl OptionChange {
    pub fn option_key(&self) -> &str {
        match self {
            OptionChange::Created { option_key, .. } | OptionChange::Replaced { option_key, .. } => option_key,
        }
    }
}

/// Single-event history payloads, tagged by `action`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ChangeEvent {
    Created { version: i32 },
    Updated { option_key: String },
    Migrated { from_version: i32, to_version: i32 },
}

/// The `changes` field of a history entry: either a batch of per-option diffs or one event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryChanges {
    Batch(Vec<OptionChange>),
    Event(ChangeEvent),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub changes: HistoryChanges,
    pub changed_by: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct SelectionOptions(pub Vec<OptionState>);

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct SelectionHistory(pub Vec<HistoryEntry>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_selection")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub service_id: Uuid,
    pub configuration_version: i32,
    #[sea_orm(column_type = "JsonBinary")]
    pub options: SelectionOptions,
    #[sea_orm(column_type = "JsonBinary")]
    pub history: SelectionHistory,
    pub is_locked: bool,
    pub locked_at: Option<DateTimeWithTimeZone>,
    pub locked_by: Option<String>,
    pub revision: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Service }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Service => Entity::belongs_to(service::Entity)
                .from(Column::ServiceId)
                .to(service::Column::Id)
                .into(),
        }
    }
}

impl Related<service::Entity> for Entity {
    fn to() -> RelationDef { Relation::Service.def() }
}

impl ActiveModelBehavior for ActiveModel {}
