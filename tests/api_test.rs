use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt; // for `oneshot`

use smartsave::api::{build_router, build_state};
use smartsave::config::Config;

fn create_test_config(temp_dir: &TempDir) -> Config {
    let config_toml = format!(
        r#"
[server]
bind_addr = "127.0.0.1:0"
store_path = "{}"

[naming]
pattern = "{{mainTopic}}_{{siteName}}_{{date}}"
use_timestamp = true
ai_enabled = false

[history]
max_entries = 100
retention_hours = 24
    "#,
        temp_dir.path().join("store").display()
    );

    toml::from_str(&config_toml).expect("Failed to parse test config")
}

fn build_test_app() -> (Router, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let state = build_state(create_test_config(&temp_dir)).expect("Failed to build state");
    (build_router(state), temp_dir)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn name_request(id: u64) -> Value {
    json!({
        "download": {
            "id": id,
            "url": "https://cdn.example.com/files/q3.pdf",
            "suggested_filename": "q3.pdf",
            "created_at": "2024-01-01T12:00:00Z"
        },
        "page": {
            "title": "Quarterly Report",
            "url": "https://www.example.com/reports"
        }
    })
}

#[tokio::test]
async fn test_health_check() {
    let (app, _temp) = build_test_app();

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["history_count"], 0);
    assert_eq!(body["metrics"]["decisions"], 0);
}

#[tokio::test]
async fn test_created_events_are_batched() {
    let (app, _temp) = build_test_app();
    let event = |id: u64, at: &str| {
        json!({"id": id, "url": "https://example.com/a", "suggested_filename": "a.zip", "created_at": at})
    };

    let (_, first) = send(
        &app,
        Method::POST,
        "/downloads/created",
        Some(event(1, "2024-01-01T12:00:00.000Z")),
    )
    .await;
    let (_, second) = send(
        &app,
        Method::POST,
        "/downloads/created",
        Some(event(2, "2024-01-01T12:00:00.200Z")),
    )
    .await;
    let (_, third) = send(
        &app,
        Method::POST,
        "/downloads/created",
        Some(event(3, "2024-01-01T12:00:00.800Z")),
    )
    .await;
    // 700ms after the previous event but 1500ms after the first
    let (_, fourth) = send(
        &app,
        Method::POST,
        "/downloads/created",
        Some(event(4, "2024-01-01T12:00:01.500Z")),
    )
    .await;

    assert_eq!(first, json!({"new_batch": true, "batch_size": 1}));
    assert_eq!(second, json!({"new_batch": false, "batch_size": 2}));
    assert_eq!(third, json!({"new_batch": false, "batch_size": 3}));
    assert_eq!(fourth, json!({"new_batch": true, "batch_size": 1}));
}

#[tokio::test]
async fn test_name_with_ai_disabled_uses_local_name() {
    let (app, _temp) = build_test_app();

    let (status, body) = send(&app, Method::POST, "/downloads/name", Some(name_request(1))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filename"], "Quarterly_Report_example.com_20240101.pdf");
    assert_eq!(body["conflict_action"], "uniquify");
    assert_eq!(body["used_ai"], false);
    assert_eq!(body["fallback"], "ai_disabled");
}

#[tokio::test]
async fn test_name_rejects_malformed_body() {
    let (app, _temp) = build_test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/downloads/name",
        Some(json!({"download": {"id": "nope"}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PAYLOAD");
    assert!(body["message"].as_str().unwrap().contains("invalid type"));
}

#[tokio::test]
async fn test_malformed_json_is_reported_as_api_error() {
    let (app, _temp) = build_test_app();

    let request = Request::builder()
        .method(Method::PUT)
        .uri("/settings")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "INVALID_PAYLOAD");
}

#[tokio::test]
async fn test_completed_download_is_recorded() {
    let (app, _temp) = build_test_app();

    send(&app, Method::POST, "/downloads/name", Some(name_request(7))).await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/downloads/changed",
        Some(json!({"id": 7, "state": "complete", "file_size": 1536, "mime_type": "application/pdf"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recorded"], true);

    let (_, history) = send(&app, Method::GET, "/history", None).await;
    let records = history.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], 7);
    assert_eq!(records[0]["original_name"], "q3.pdf");
    assert_eq!(records[0]["new_name"], "Quarterly_Report_example.com_20240101.pdf");
    assert_eq!(records[0]["url"], "https://cdn.example.com/files/q3.pdf");
    assert_eq!(records[0]["file_size"], 1536);
    assert!(records[0]["timestamp"].as_i64().unwrap() > 0);

    let (_, cleared) = send(&app, Method::DELETE, "/history", None).await;
    assert_eq!(cleared["cleared"], 1);
    let (_, history) = send(&app, Method::GET, "/history", None).await;
    assert_eq!(history, json!([]));
}

#[tokio::test]
async fn test_cancelled_and_interrupted_downloads_are_not_recorded() {
    let (app, _temp) = build_test_app();

    send(&app, Method::POST, "/downloads/name", Some(name_request(1))).await;
    send(&app, Method::POST, "/downloads/name", Some(name_request(2))).await;

    let (_, cancelled) = send(
        &app,
        Method::POST,
        "/downloads/changed",
        Some(json!({"id": 1, "state": "canceled"})),
    )
    .await;
    let (_, interrupted) = send(
        &app,
        Method::POST,
        "/downloads/changed",
        Some(json!({"id": 2, "state": "interrupted", "error": "NETWORK_FAILED"})),
    )
    .await;

    assert_eq!(cancelled["recorded"], false);
    assert_eq!(interrupted["recorded"], false);

    let (_, history) = send(&app, Method::GET, "/history", None).await;
    assert_eq!(history, json!([]));
}

#[tokio::test]
async fn test_provider_lifecycle() {
    let (app, _temp) = build_test_app();

    let (status, added) = send(
        &app,
        Method::POST,
        "/providers",
        Some(json!({
            "display_name": "DeepSeek",
            "endpoint": "https://api.deepseek.com/chat/completions",
            "api_key": "sk-secret",
            "is_default": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = added["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("custom-"));
    assert_eq!(added["is_default"], false);
    assert_eq!(added["has_api_key"], true);
    assert!(!added.to_string().contains("sk-secret"));

    let (status, _) = send(&app, Method::DELETE, "/providers/custom-default", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, providers) =
        send(&app, Method::POST, &format!("/providers/{id}/default"), None).await;
    assert_eq!(status, StatusCode::OK);
    let defaults: Vec<&Value> = providers
        .as_array()
        .unwrap()
        .iter()
        .filter(|p| p["is_default"] == true)
        .collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0]["id"], id.as_str());
    assert_eq!(defaults[0]["is_active"], true);

    // Now both default and active
    let (status, _) = send(&app, Method::DELETE, &format!("/providers/{id}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, updated) = send(
        &app,
        Method::PUT,
        "/providers/custom-default",
        Some(json!({"api_key": "sk-other", "model": "gpt-4o-mini"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["model"], "gpt-4o-mini");
    assert_eq!(updated["has_api_key"], true);

    let (status, _) = send(&app, Method::DELETE, "/providers/custom-default", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, providers) = send(&app, Method::GET, "/providers", None).await;
    assert_eq!(providers.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_provider_is_not_found() {
    let (app, _temp) = build_test_app();

    let (status, body) = send(
        &app,
        Method::PUT,
        "/providers/missing",
        Some(json!({"api_key": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = send(&app, Method::POST, "/providers/missing/test", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_probe_reports_missing_credentials() {
    let (app, _temp) = build_test_app();

    let (status, body) = send(&app, Method::POST, "/providers/custom-default/test", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], false);
    assert!(body["error"].as_str().unwrap().contains("custom-default"));
}

#[tokio::test]
async fn test_settings_replace_is_validated() {
    let (app, _temp) = build_test_app();

    let (_, current) = send(&app, Method::GET, "/settings", None).await;
    let mut naming = current["naming"].clone();

    naming["ai_timeout_seconds"] = json!(45);
    let (status, body) = send(&app, Method::PUT, "/settings", Some(naming.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PAYLOAD");

    naming["ai_timeout_seconds"] = json!(3);
    naming["active_provider_id"] = json!("missing");
    let (status, _) = send(&app, Method::PUT, "/settings", Some(naming.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    naming["active_provider_id"] = json!("custom-default");
    naming["pattern"] = json!("{siteName}-{mainTopic}");
    naming["use_timestamp"] = json!(false);
    let (status, saved) = send(&app, Method::PUT, "/settings", Some(naming)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["naming"]["pattern"], "{siteName}-{mainTopic}");

    let (_, body) = send(&app, Method::POST, "/downloads/name", Some(name_request(3))).await;
    assert_eq!(body["filename"], "example.com-Quarterly_Report.pdf");
}

#[tokio::test]
async fn test_settings_survive_restart() {
    let temp_dir = TempDir::new().unwrap();

    {
        let app = build_router(build_state(create_test_config(&temp_dir)).unwrap());
        let (status, _) = send(
            &app,
            Method::POST,
            "/providers",
            Some(json!({"id": "openai", "display_name": "OpenAI"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let app = build_router(build_state(create_test_config(&temp_dir)).unwrap());
    let (_, providers) = send(&app, Method::GET, "/providers", None).await;
    let ids: Vec<&str> = providers
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["custom-default", "openai"]);
}
