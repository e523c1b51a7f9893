use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::error;

use service::errors::ServiceError;

/// JSON error body: `{"error": <title>, "message": <detail>, ...extra}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: String,
    pub detail: Option<String>,
    pub extra: Map<String, Value>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &str, detail: Option<String>) -> Self {
        Self { status, title: title.to_string(), detail, extra: Map::new() }
    }

    pub fn with_extra(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let mut body = Map::new();
        let message = self.detail.unwrap_or_else(|| self.title.clone());
        body.insert("error".into(), Value::String(self.title));
        body.insert("message".into(), Value::String(message));
        body.extend(self.extra);
        (self.status, Json(Value::Object(body))).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) => JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(msg)),
            ServiceError::NotFound(msg) => JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(msg)),
            ServiceError::Conflict(msg) => JsonApiError::new(StatusCode::BAD_REQUEST, "Conflict", Some(msg)),
            ServiceError::Locked { locked_by, locked_at } => {
                JsonApiError::new(StatusCode::BAD_REQUEST, "Locked", Some("Selection is already locked".into()))
                    .with_extra("lockedBy", serde_json::json!(locked_by))
                    .with_extra("lockedAt", serde_json::json!(locked_at))
            }
            ServiceError::StaleRevision(msg) => JsonApiError::new(StatusCode::CONFLICT, "Stale Revision", Some(msg)),
            ServiceError::Db(msg) => {
                error!(error = %msg, "storage failure");
                JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some("internal server error".into()))
            }
        }
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(rejection: JsonRejection) -> Self {
        JsonApiError::new(StatusCode::BAD_REQUEST, "Invalid Body", Some(rejection.body_text()))
    }
}

impl From<PathRejection> for JsonApiError {
    fn from(rejection: PathRejection) -> Self {
        JsonApiError::new(StatusCode::BAD_REQUEST, "Invalid Path", Some(rejection.body_text()))
    }
}

impl From<QueryRejection> for JsonApiError {
    fn from(rejection: QueryRejection) -> Self {
        JsonApiError::new(StatusCode::BAD_REQUEST, "Invalid Query", Some(rejection.body_text()))
    }
}

/// `Json` extractor whose rejections render as `JsonApiError`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(JsonApiError))]
pub struct ApiJson<T>(pub T);

/// `Path` extractor whose rejections render as `JsonApiError`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(JsonApiError))]
pub struct ApiPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(JsonApiError))]
pub struct ApiQuery<T>(pub T);

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(resp: Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn locked_carries_holder() {
        let err: JsonApiError = ServiceError::Locked { locked_by: Some("planner".into()), locked_at: None }.into();
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["lockedBy"], "planner");
        assert!(body["lockedAt"].is_null());
        assert_eq!(body["message"], "Selection is already locked");
    }

    #[tokio::test]
    async fn db_errors_hide_detail() {
        let err: JsonApiError = ServiceError::Db("relation \"service_selection\" does not exist".into()).into();
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body["message"], "internal server error");
    }

    #[test]
    fn status_mapping() {
        let cases = [
            (ServiceError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ServiceError::Conflict("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::StaleRevision("x".into()), StatusCode::CONFLICT),
        ];
        for (e, status) in cases {
            assert_eq!(JsonApiError::from(e).status, status);
        }
    }
}
