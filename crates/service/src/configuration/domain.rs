use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use models::service_configuration::{OptionCategory, OptionType, SelectionRules};

/// Schema of selectable option slots for one service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfiguration {
    pub id: Uuid,
    #[serde(rename = "service")]
    pub service_id: Uuid,
    pub option_types: Vec<OptionType>,
    pub selection_rules: SelectionRules,
    pub version: i32,
    pub is_active: bool,
    /// Compare-and-swap counter; bumped by every successful save.
    pub revision: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceConfiguration {
    pub fn new(service_id: Uuid, option_types: Vec<OptionType>, selection_rules: SelectionRules, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            service_id,
            option_types,
            selection_rules,
            version: 1,
            is_active: true,
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.option_types.iter().any(|ot| ot.key == key)
    }

    pub fn keys(&self) -> HashSet<&str> {
        self.option_types.iter().map(|ot| ot.key.as_str()).collect()
    }
}

impl From<models::service_configuration::Model> for ServiceConfiguration {
    fn from(m: models::service_configuration::Model) -> Self {
        Self {
            id: m.id,
            service_id: m.service_id,
            option_types: m.option_types.0,
            selection_rules: m.selection_rules,
            version: m.version,
            is_active: m.is_active,
            revision: m.revision,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        }
    }
}

/// Body of `PUT /configurations/{serviceId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceConfigurationInput {
    #[serde(default)]
    pub option_types: Vec<OptionType>,
    #[serde(default)]
    pub selection_rules: Option<SelectionRules>,
}

/// Body of `PATCH /configurations/{serviceId}/reorder-options`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderInput {
    pub ordered_keys: Vec<String>,
}
