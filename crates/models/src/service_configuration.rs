use std::collections::HashSet;

use sea_orm::{entity::prelude::*, FromJsonQueryResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{errors, service};

/// Presentation bucket of an option type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionCategory {
    #[default]
    Included,
    Addon,
    Premium,
    Excluded,
}

/// A named slot of a service's schema, e.g. `starters` or `decor`.
///
/// `key` and `label` default to empty strings on input so that a missing field
/// surfaces as a validation error naming it rather than a decode failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionType {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub category: OptionCategory,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub min_selections: u32,
    /// `None` means unlimited.
    #[serde(default)]
    pub max_selections: Option<u32>,
    #[serde(default)]
    pub allow_custom_items: bool,
}

impl OptionType {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            icon: None,
            category: OptionCategory::default(),
            display_order: 0,
            is_required: false,
            min_selections: 0,
            max_selections: None,
            allow_custom_items: false,
        }
    }

    pub fn validate(&self) -> Result<(), errors::ModelError> {
        if self.key.trim().is_empty() {
            return Err(errors::ModelError::Validation("option type key is required".into()));
        }
        if self.label.trim().is_empty() {
            return Err(errors::ModelError::Validation(format!("option type label is required (key: {})", self.key)));
        }
        if let Some(max) = self.max_selections {
            if max < self.min_selections {
                return Err(errors::ModelError::Validation(format!(
                    "maxSelections must be >= minSelections (key: {})",
                    self.key
                )));
            }
        }
        Ok(())
    }
}

/// Validate a full option type sequence: non-empty, every entry valid, keys unique.
pub fn validate_option_types(option_types: &[OptionType]) -> Result<(), errors::ModelError> {
    if option_types.is_empty() {
        return Err(errors::ModelError::Validation("at least one option type is required".into()));
    }
    let mut seen = HashSet::with_capacity(option_types.len());
    for ot in option_types {
        ot.validate()?;
        if !seen.insert(ot.key.as_str()) {
            return Err(errors::ModelError::Validation(format!("duplicate option type key: {}", ot.key)));
        }
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRules {
    #[serde(default = "default_true")]
    pub allow_mixed_categories: bool,
    #[serde(default)]
    pub require_minimum_selection: bool,
}

fn default_true() -> bool { true }

impl Default for SelectionRules {
    fn default() -> Self {
        Self { allow_mixed_categories: true, require_minimum_selection: false }
    }
}

/// jsonb wrapper for the ordered option type sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct OptionTypes(pub Vec<OptionType>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_configuration")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub service_id: Uuid,
    #[sea_orm(column_type = "JsonBinary")]
    pub option_types: OptionTypes,
    #[sea_orm(column_type = "JsonBinary")]
    pub selection_rules: SelectionRules,
    pub version: i32,
    pub is_active: bool,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_type_defaults_fill_missing_fields() {
        let ot: OptionType = serde_json::from_value(serde_json::json!({"key": "starters", "label": "Starters"})).unwrap();
        assert_eq!(ot, OptionType::new("starters", "Starters"));
        let wire = serde_json::to_value(&ot).unwrap();
        assert_eq!(wire["category"], "included");
        assert_eq!(wire["displayOrder"], 0);
        assert!(wire["maxSelections"].is_null());
        assert!(wire.get("icon").is_none());
    }

    #[test]
    fn missing_label_is_a_validation_error() {
        let ot: OptionType = serde_json::from_value(serde_json::json!({"key": "decor"})).unwrap();
        let err = ot.validate().unwrap_err().to_string();
        assert!(err.contains("label"), "{err}");
    }

    #[test]
    fn duplicate_keys_rejected() {
        let list = vec![OptionType::new("a", "A"), OptionType::new("b", "B"), OptionType::new("a", "Again")];
        let err = validate_option_types(&list).unwrap_err().to_string();
        assert!(err.contains("duplicate option type key: a"), "{err}");
    }

    #[test]
    fn empty_sequence_rejected() {
        assert!(validate_option_types(&[]).is_err());
    }

    #[test]
    fn max_below_min_rejected() {
        let mut ot = OptionType::new("decor", "Decor");
        ot.min_selections = 3;
        ot.max_selections = Some(1);
        assert!(ot.validate().is_err());
        ot.max_selections = None;
        assert!(ot.validate().is_ok());
    }

    #[test]
    fn selection_rules_default_allows_mixing() {
        let rules: SelectionRules = serde_json::from_str("{}").unwrap();
        assert_eq!(rules, SelectionRules::default());
        assert!(rules.allow_mixed_categories);
    }
}
