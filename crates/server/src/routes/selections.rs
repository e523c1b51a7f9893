use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use service::selection::domain::{HistoryEntry, LockInput, SaveSelectionInput, SelectionView, ServiceSelection, UpdateOptionInput};

use crate::errors::{ApiJson, ApiPath, ApiQuery, JsonApiError};
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// Maximum number of entries; defaults to 50.
    pub limit: Option<usize>,
}

#[utoipa::path(
    get, path = "/selections/{service_id}", tag = "selections",
    params(("service_id" = Uuid, Path, description = "Service id")),
    responses(
        (status = 200, description = "Selection at the current configuration version", body = crate::openapi::SelectionDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get_selection(
    State(state): State<ServerState>,
    ApiPath(service_id): ApiPath<Uuid>,
) -> Result<Json<SelectionView>, JsonApiError> {
    Ok(Json(state.selections.get_selection(service_id).await?))
}

#[utoipa::path(
    put, path = "/selections/{service_id}", tag = "selections",
    params(("service_id" = Uuid, Path, description = "Service id")),
    request_body = crate::openapi::SaveSelectionDoc,
    responses(
        (status = 200, description = "Saved", body = crate::openapi::SelectionDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc),
        (status = 409, description = "Stale Revision", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn save_selection(
    State(state): State<ServerState>,
    ApiPath(service_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<SaveSelectionInput>,
) -> Result<Json<SelectionView>, JsonApiError> {
    Ok(Json(state.selections.save_selection(service_id, input).await?))
}

#[utoipa::path(
    post, path = "/selections/{service_id}/option/{option_key}", tag = "selections",
    params(
        ("service_id" = Uuid, Path, description = "Service id"),
        ("option_key" = String, Path, description = "Existing option slot")
    ),
    request_body = crate::openapi::UpdateOptionDoc,
    responses(
        (status = 200, description = "Option replaced", body = crate::openapi::SelectionDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update_option(
    State(state): State<ServerState>,
    ApiPath((service_id, option_key)): ApiPath<(Uuid, String)>,
    ApiJson(input): ApiJson<UpdateOptionInput>,
) -> Result<Json<SelectionView>, JsonApiError> {
    Ok(Json(state.selections.update_option(service_id, &option_key, input).await?))
}

#[utoipa::path(
    get, path = "/selections/{service_id}/history", tag = "selections",
    params(("service_id" = Uuid, Path, description = "Service id"), HistoryQuery),
    responses(
        (status = 200, description = "Most recent entries first", body = [crate::openapi::HistoryEntryDoc]),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get_history(
    State(state): State<ServerState>,
    ApiPath(service_id): ApiPath<Uuid>,
    ApiQuery(q): ApiQuery<HistoryQuery>,
) -> Result<Json<Vec<HistoryEntry>>, JsonApiError> {
    let limit = state.selection_cfg.history_limit(q.limit);
    Ok(Json(state.selections.history(service_id, limit).await?))
}

#[utoipa::path(
    patch, path = "/selections/{service_id}/lock", tag = "selections",
    params(("service_id" = Uuid, Path, description = "Service id")),
    request_body(content = crate::openapi::LockDoc, description = "Optional; lockedBy defaults to admin"),
    responses(
        (status = 200, description = "Locked", body = crate::openapi::StoredSelectionDoc),
        (status = 400, description = "Already locked", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn lock(
    State(state): State<ServerState>,
    ApiPath(service_id): ApiPath<Uuid>,
    body: Option<Json<LockInput>>,
) -> Result<Json<ServiceSelection>, JsonApiError> {
    let input = body.map(|Json(input)| input).unwrap_or_default();
    Ok(Json(state.selections.lock(service_id, &input.locked_by).await?))
}

#[utoipa::path(
    patch, path = "/selections/{service_id}/unlock", tag = "selections",
    params(("service_id" = Uuid, Path, description = "Service id")),
    responses(
        (status = 200, description = "Unlocked", body = crate::openapi::StoredSelectionDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn unlock(
    State(state): State<ServerState>,
    ApiPath(service_id): ApiPath<Uuid>,
) -> Result<Json<ServiceSelection>, JsonApiError> {
    Ok(Json(state.selections.unlock(service_id).await?))
}

#[utoipa::path(
    post, path = "/selections/{service_id}/migrate-version", tag = "selections",
    params(("service_id" = Uuid, Path, description = "Service id")),
    responses(
        (status = 200, description = "New selection for the current version", body = crate::openapi::SelectionDoc),
        (status = 400, description = "Selection for this version already exists", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn migrate_version(
    State(state): State<ServerState>,
    ApiPath(service_id): ApiPath<Uuid>,
) -> Result<Json<SelectionView>, JsonApiError> {
    Ok(Json(state.selections.migrate(service_id).await?))
}
