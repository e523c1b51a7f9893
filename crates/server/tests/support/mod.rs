#![allow(dead_code)]
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::Service;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes::{self, auth};
use service::catalog::repository::mock::MockCatalogRepository;
use service::configuration::repository::mock::MockConfigurationRepository;
use service::configuration::ConfigurationService;
use service::selection::repository::mock::MockSelectionRepository;
use service::selection::SelectionService;

pub struct TestApp {
    pub app: Router,
    pub catalog: Arc<MockCatalogRepository>,
}

/// Router over in-memory repositories; bearer checks enabled when `jwt_secret` is set.
pub fn test_app(jwt_secret: Option<&str>) -> TestApp {
    let catalog = Arc::new(MockCatalogRepository::default());
    let configs = Arc::new(MockConfigurationRepository::default());
    let selections = Arc::new(MockSelectionRepository::default());
    let state = auth::ServerState {
        configurations: Arc::new(ConfigurationService::new(configs.clone(), catalog.clone())),
        selections: Arc::new(SelectionService::new(configs, selections, catalog.clone())),
        selection_cfg: configs::SelectionConfig::default(),
        auth: auth::ServerAuthConfig { jwt_secret: jwt_secret.map(str::to_string) },
    };
    TestApp { app: routes::build_router(state, CorsLayer::very_permissive()), catalog }
}

impl TestApp {
    pub async fn service(&self, name: &str) -> Uuid { self.catalog.add_service(name).await }

    pub async fn menu_item(&self, name: &str) -> Uuid { self.catalog.add_menu_item(name).await }

    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
        self.send_with(method, uri, body, None).await
    }

    pub async fn send_with(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        bearer: Option<&str>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let req = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };
        let resp = self.app.clone().call(req).await?;
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        Ok((status, value))
    }
}
