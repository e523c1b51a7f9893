mod support;

use axum::http::StatusCode;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use uuid::Uuid;

use support::test_app;

#[tokio::test]
async fn configuration_lifecycle() -> anyhow::Result<()> {
    let t = test_app(None);
    let sid = t.service("Wedding Buffet").await;
    let uri = format!("/configurations/{sid}");

    let (status, _) = t.send("GET", &uri, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, cfg) = t
        .send("PUT", &uri, Some(json!({"optionTypes": [{"key": "starters", "label": "Starters"}]})))
        .await?;
    assert_eq!(status, StatusCode::OK, "{cfg}");
    assert_eq!(cfg["version"], 1);
    assert_eq!(cfg["service"], sid.to_string());
    assert_eq!(cfg["optionTypes"][0]["category"], "included");
    assert_eq!(cfg["selectionRules"]["allowMixedCategories"], true);

    let (status, cfg) = t
        .send("POST", &format!("{uri}/option-type"), Some(json!({"key": "decor", "label": "Decor", "category": "addon"})))
        .await?;
    assert_eq!(status, StatusCode::OK, "{cfg}");
    assert_eq!(cfg["version"], 2);
    assert_eq!(cfg["optionTypes"].as_array().map(Vec::len), Some(2));

    let (status, body) = t
        .send("POST", &format!("{uri}/option-type"), Some(json!({"key": "decor", "label": "Decor"})))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");

    let (status, cfg) = t
        .send("PATCH", &format!("{uri}/reorder-options"), Some(json!({"orderedKeys": ["decor"]})))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cfg["optionTypes"].as_array().map(Vec::len), Some(1));
    assert_eq!(cfg["optionTypes"][0]["key"], "decor");
    assert_eq!(cfg["version"], 2);

    let (status, cfg) = t.send("DELETE", &format!("{uri}/option-type/decor"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cfg["version"], 3);
    let (status, _) = t.send("DELETE", &format!("{uri}/option-type/decor"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn rules_only_replace_keeps_version() -> anyhow::Result<()> {
    let t = test_app(None);
    let sid = t.service("Corporate Lunch").await;
    let uri = format!("/configurations/{sid}");
    let types = json!([{"key": "mains", "label": "Mains"}]);

    t.send("PUT", &uri, Some(json!({"optionTypes": types}))).await?;
    let (status, cfg) = t
        .send("PUT", &uri, Some(json!({"optionTypes": types, "selectionRules": {"allowMixedCategories": false}})))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cfg["version"], 1);
    assert_eq!(cfg["selectionRules"]["allowMixedCategories"], false);
    assert_eq!(cfg["selectionRules"]["requireMinimumSelection"], false);
    Ok(())
}

#[tokio::test]
async fn client_faults() -> anyhow::Result<()> {
    let t = test_app(None);
    let sid = t.service("Birthday").await;
    let uri = format!("/configurations/{sid}");

    let (status, body) = t.send("PUT", &uri, Some(json!({"optionTypes": []}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap_or_default().contains("option type"), "{body}");

    let (status, body) = t.send("PUT", &uri, Some(json!({"optionTypes": [{"key": "decor"}]}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap_or_default().contains("label"), "{body}");

    let (status, body) = t
        .send("PUT", &format!("/configurations/{}", Uuid::new_v4()), Some(json!({"optionTypes": [{"key": "a", "label": "A"}]})))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");

    let (status, body) = t.send("PUT", &uri, Some(json!({"optionTypes": "starters"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid Body");

    t.send("PUT", &uri, Some(json!({"optionTypes": [{"key": "a", "label": "A"}]}))).await?;
    let (status, body) = t
        .send("PATCH", &format!("{uri}/reorder-options"), Some(json!({"orderedKeys": ["a", "zzz"]})))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap_or_default().contains("zzz"), "{body}");

    let (status, body) = t.send("GET", "/configurations/not-a-uuid", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid Path");
    assert!(body["message"].is_string(), "{body}");

    let (status, body) = t.send("GET", &format!("/selections/{sid}/history?limit=-1"), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid Query");
    Ok(())
}

#[tokio::test]
async fn bearer_token_guards_api_routes() -> anyhow::Result<()> {
    let secret = "test-secret";
    let t = test_app(Some(secret));
    let sid = t.service("Gala").await;
    let uri = format!("/configurations/{sid}");

    let (status, _) = t.send("GET", "/health", None).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = t.send("GET", &uri, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = t.send_with("GET", &uri, None, Some("not-a-jwt")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let exp = (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize;
    let token = encode(
        &Header::default(),
        &json!({"sub": "admin@example.com", "exp": exp}),
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    let (status, _) = t.send_with("GET", &uri, None, Some(&token)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND, "authorized request reaches the handler");
    Ok(())
}
