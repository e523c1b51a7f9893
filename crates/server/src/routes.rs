pub mod auth;
pub mod configurations;
pub mod selections;

use axum::{
    http::{header, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::errors::JsonApiError;
use crate::openapi::ApiDoc;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

/// Prometheus text exposition of the default registry.
pub async fn metrics() -> Result<impl IntoResponse, JsonApiError> {
    let body = service::metrics::encode_metrics().map_err(|e| {
        JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Metrics Unavailable", Some(e.to_string()))
    })?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: public health and docs routes plus the bearer-protected API.
pub fn build_router(state: auth::ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api-docs/openapi.json", get(openapi_json));

    let api = Router::new()
        .route(
            "/configurations/:service_id",
            get(configurations::get_configuration).put(configurations::replace_configuration),
        )
        .route("/configurations/:service_id/option-type", post(configurations::add_option_type))
        .route(
            "/configurations/:service_id/option-type/:key",
            axum::routing::delete(configurations::remove_option_type),
        )
        .route("/configurations/:service_id/reorder-options", patch(configurations::reorder_option_types))
        .route(
            "/selections/:service_id",
            get(selections::get_selection).put(selections::save_selection),
        )
        .route("/selections/:service_id/option/:option_key", post(selections::update_option))
        .route("/selections/:service_id/history", get(selections::get_history))
        .route("/selections/:service_id/lock", patch(selections::lock))
        .route("/selections/:service_id/unlock", patch(selections::unlock))
        .route("/selections/:service_id/migrate-version", post(selections::migrate_version))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer_token_state,
        ));

    public
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request with method and path
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // status and latency
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx and friends at ERROR
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
