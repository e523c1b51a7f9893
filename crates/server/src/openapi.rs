use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String, pub version: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ErrorDoc {
    pub error: String,
    pub message: String,
    /// Present on lock conflicts.
    pub locked_by: Option<String>,
    pub locked_at: Option<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct OptionTypeDoc {
    pub key: String,
    pub label: String,
    pub icon: Option<String>,
    /// included | addon | premium | excluded
    pub category: Option<String>,
    pub display_order: Option<i32>,
    pub is_required: Option<bool>,
    pub min_selections: Option<u32>,
    /// null means unlimited
    pub max_selections: Option<u32>,
    pub allow_custom_items: Option<bool>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct SelectionRulesDoc {
    pub allow_mixed_categories: bool,
    pub require_minimum_selection: bool,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ReplaceConfigurationDoc {
    pub option_types: Vec<OptionTypeDoc>,
    pub selection_rules: Option<SelectionRulesDoc>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ReorderDoc { pub ordered_keys: Vec<String> }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ServiceConfigurationDoc {
    pub id: Uuid,
    pub service: Uuid,
    pub option_types: Vec<OptionTypeDoc>,
    pub selection_rules: SelectionRulesDoc,
    pub version: i32,
    pub is_active: bool,
    pub revision: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct SelectionItemInputDoc {
    pub item_id: Uuid,
    #[schema(value_type = Option<Object>)]
    pub custom_data: Option<serde_json::Value>,
    pub added_at: Option<String>,
    /// admin | customer | system
    pub added_by: Option<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct OptionStateInputDoc {
    pub option_key: String,
    pub selected: Vec<SelectionItemInputDoc>,
    pub unselected: Vec<SelectionItemInputDoc>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct SaveSelectionDoc {
    pub options: Vec<OptionStateInputDoc>,
    pub changed_by: Option<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct UpdateOptionDoc {
    pub selected: Vec<SelectionItemInputDoc>,
    pub unselected: Vec<SelectionItemInputDoc>,
    pub changed_by: Option<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct LockDoc { pub locked_by: Option<String> }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct HistoryEntryDoc {
    pub timestamp: String,
    /// Either a list of per-option diffs or a single `{action: created|updated|migrated, ...}` event.
    #[schema(value_type = Object)]
    pub changes: serde_json::Value,
    pub changed_by: String,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ResolvedItemDoc {
    pub item_id: Uuid,
    /// Catalog record, null when it no longer exists.
    #[schema(value_type = Option<Object>)]
    pub item: Option<serde_json::Value>,
    #[schema(value_type = Option<Object>)]
    pub custom_data: Option<serde_json::Value>,
    pub added_at: String,
    pub added_by: String,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct OptionStateDoc {
    pub option_key: String,
    pub selected: Vec<ResolvedItemDoc>,
    pub unselected: Vec<ResolvedItemDoc>,
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct SelectionDoc {
    pub id: Uuid,
    pub service: Uuid,
    pub configuration_version: i32,
    pub options: Vec<OptionStateDoc>,
    pub history: Vec<HistoryEntryDoc>,
    pub is_locked: bool,
    pub locked_at: Option<String>,
    pub locked_by: Option<String>,
    pub revision: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Lock and unlock return the stored document; item references stay unresolved.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct StoredSelectionDoc {
    pub id: Uuid,
    pub service: Uuid,
    pub configuration_version: i32,
    #[schema(value_type = Vec<Object>)]
    pub options: Vec<serde_json::Value>,
    pub history: Vec<HistoryEntryDoc>,
    pub is_locked: bool,
    pub locked_at: Option<String>,
    pub locked_by: Option<String>,
    pub revision: i64,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::configurations::get_configuration,
        crate::routes::configurations::replace_configuration,
        crate::routes::configurations::add_option_type,
        crate::routes::configurations::remove_option_type,
        crate::routes::configurations::reorder_option_types,
        crate::routes::selections::get_selection,
        crate::routes::selections::save_selection,
        crate::routes::selections::update_option,
        crate::routes::selections::get_history,
        crate::routes::selections::lock,
        crate::routes::selections::unlock,
        crate::routes::selections::migrate_version,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorDoc,
            OptionTypeDoc,
            SelectionRulesDoc,
            ReplaceConfigurationDoc,
            ReorderDoc,
            ServiceConfigurationDoc,
            SelectionItemInputDoc,
            OptionStateInputDoc,
            SaveSelectionDoc,
            UpdateOptionDoc,
            LockDoc,
            HistoryEntryDoc,
            ResolvedItemDoc,
            OptionStateDoc,
            SelectionDoc,
            StoredSelectionDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "configurations"),
        (name = "selections")
    )
)]
pub struct ApiDoc;
