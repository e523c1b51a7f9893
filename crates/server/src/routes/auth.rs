use std::sync::Arc;

use axum::{extract::{Request, State}, http::StatusCode, middleware::Next, response::Response};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use configs::SelectionConfig;
use service::configuration::ConfigurationService;
use service::selection::SelectionService;

use crate::errors::JsonApiError;

#[derive(Clone, Default)]
pub struct ServerAuthConfig {
    /// HS256 secret; bearer checks are skipped when unset.
    pub jwt_secret: Option<String>,
}

#[derive(Clone)]
pub struct ServerState {
    pub configurations: Arc<ConfigurationService>,
    pub selections: Arc<SelectionService>,
    pub selection_cfg: SelectionConfig,
    pub auth: ServerAuthConfig,
}

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<String>,
}

/// Route middleware: verify `Authorization: Bearer <token>` when a secret is configured.
/// Missing, malformed or invalid tokens are rejected with 401.
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let Some(secret) = state.auth.jwt_secret.as_deref() else {
        return Ok(next.run(req).await);
    };
    if req.method() == axum::http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }
    let path = req.uri().path().to_string();

    let token = match req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        Some(h) => match h.strip_prefix("Bearer ") {
            Some(t) if !t.trim().is_empty() => t.trim().to_string(),
            _ => {
                tracing::warn!(path = %path, "invalid Authorization format (expect Bearer)");
                return Err(unauthorized("invalid authorization header"));
            }
        },
        None => {
            tracing::warn!(path = %path, "missing Authorization header");
            return Err(unauthorized("missing bearer token"));
        }
    };

    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();

    match decode::<Claims>(&token, &key, &validation) {
        Ok(data) => {
            tracing::debug!(path = %path, sub = ?data.claims.sub, "bearer token accepted");
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(path = %path, err = %e, "token validation failed");
            Err(unauthorized("invalid or expired token"))
        }
    }
}

fn unauthorized(detail: &str) -> JsonApiError {
    JsonApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some(detail.to_string()))
}
