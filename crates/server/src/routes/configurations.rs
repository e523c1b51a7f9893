use axum::{extract::State, Json};
use uuid::Uuid;

use service::configuration::domain::{OptionType, ReorderInput, ReplaceConfigurationInput, ServiceConfiguration};

use crate::errors::{ApiJson, ApiPath, JsonApiError};
use crate::routes::auth::ServerState;

#[utoipa::path(
    get, path = "/configurations/{service_id}", tag = "configurations",
    params(("service_id" = Uuid, Path, description = "Service id")),
    responses(
        (status = 200, description = "Configuration", body = crate::openapi::ServiceConfigurationDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get_configuration(
    State(state): State<ServerState>,
    ApiPath(service_id): ApiPath<Uuid>,
) -> Result<Json<ServiceConfiguration>, JsonApiError> {
    Ok(Json(state.configurations.get(service_id).await?))
}

#[utoipa::path(
    put, path = "/configurations/{service_id}", tag = "configurations",
    params(("service_id" = Uuid, Path, description = "Service id")),
    request_body = crate::openapi::ReplaceConfigurationDoc,
    responses(
        (status = 200, description = "Created or replaced", body = crate::openapi::ServiceConfigurationDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Service Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn replace_configuration(
    State(state): State<ServerState>,
    ApiPath(service_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<ReplaceConfigurationInput>,
) -> Result<Json<ServiceConfiguration>, JsonApiError> {
    Ok(Json(state.configurations.create_or_replace(service_id, input).await?))
}

#[utoipa::path(
    post, path = "/configurations/{service_id}/option-type", tag = "configurations",
    params(("service_id" = Uuid, Path, description = "Service id")),
    request_body = crate::openapi::OptionTypeDoc,
    responses(
        (status = 200, description = "Option type added", body = crate::openapi::ServiceConfigurationDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn add_option_type(
    State(state): State<ServerState>,
    ApiPath(service_id): ApiPath<Uuid>,
    ApiJson(option_type): ApiJson<OptionType>,
) -> Result<Json<ServiceConfiguration>, JsonApiError> {
    Ok(Json(state.configurations.add_option_type(service_id, option_type).await?))
}

#[utoipa::path(
    delete, path = "/configurations/{service_id}/option-type/{key}", tag = "configurations",
    params(
        ("service_id" = Uuid, Path, description = "Service id"),
        ("key" = String, Path, description = "Option type key")
    ),
    responses(
        (status = 200, description = "Option type removed", body = crate::openapi::ServiceConfigurationDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn remove_option_type(
    State(state): State<ServerState>,
    ApiPath((service_id, key)): ApiPath<(Uuid, String)>,
) -> Result<Json<ServiceConfiguration>, JsonApiError> {
    Ok(Json(state.configurations.remove_option_type(service_id, &key).await?))
}

#[utoipa::path(
    patch, path = "/configurations/{service_id}/reorder-options", tag = "configurations",
    params(("service_id" = Uuid, Path, description = "Service id")),
    request_body = crate::openapi::ReorderDoc,
    responses(
        (status = 200, description = "Reordered; unlisted option types are dropped", body = crate::openapi::ServiceConfigurationDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn reorder_option_types(
    State(state): State<ServerState>,
    ApiPath(service_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<ReorderInput>,
) -> Result<Json<ServiceConfiguration>, JsonApiError> {
    Ok(Json(state.configurations.reorder_option_types(service_id, &input.ordered_keys).await?))
}
