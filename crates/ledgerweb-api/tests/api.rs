//! Router tests over a real data file

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use ledgerweb_api::{create_router, AppState};
use ledgerweb_config::Config;
use ledgerweb_core::{JsonFileStore, Ledger, DEFAULT_BUDGET_LIMIT};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::RwLock;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    path: PathBuf,
    _dir: TempDir,
}

fn setup_test_app(initial: Option<Value>) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    if let Some(doc) = initial {
        std::fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
    }

    let mut config = Config::default();
    config.data.path = path.clone();
    let store = Arc::new(JsonFileStore::new(&path));
    let ledger = Arc::new(RwLock::new(Ledger::new(store, DEFAULT_BUDGET_LIMIT)));

    TestApp {
        router: create_router(AppState { ledger, config }),
        path,
        _dir: dir,
    }
}

fn on_disk(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

async fn get_body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(app: &TestApp, uri: &str) -> (StatusCode, Value) {
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, get_body_json(response).await)
}

async fn post_raw(app: &TestApp, uri: &str, body: &str) -> (StatusCode, Value) {
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, get_body_json(response).await)
}

async fn post(app: &TestApp, uri: &str, body: Value) -> (StatusCode, Value) {
    post_raw(app, uri, &body.to_string()).await
}

fn balance_of(doc: &Value, id: &str) -> f64 {
    doc["accounts"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["id"] == id)
        .and_then(|a| a["balance"].as_f64())
        .unwrap()
}

fn example_document() -> Value {
    json!({
        "accounts": [{"id": "a1", "name": "Checking", "type": "checking", "balance": 100, "active": false, "budget_limit": 10000}],
        "transactions": []
    })
}

// ========== Document ==========

#[tokio::test]
async fn test_health_check() {
    let app = setup_test_app(None);
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_get_data_without_file() {
    let app = setup_test_app(None);

    let (status, body) = get(&app, "/api/data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"accounts": [], "transactions": []}));
    assert!(!app.path.exists());
}

#[tokio::test]
async fn test_get_data_is_idempotent() {
    let app = setup_test_app(Some(example_document()));

    let (_, first) = get(&app, "/api/data").await;
    let (_, second) = get(&app, "/api/data").await;
    assert_eq!(first, second);
    assert_eq!(first["accounts"][0]["id"], "a1");
}

#[tokio::test]
async fn test_malformed_data_file_is_server_error() {
    let app = setup_test_app(None);
    std::fs::write(&app.path, "{ broken").unwrap();

    let (status, body) = get(&app, "/api/data").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"]["code"], "INVALID_FORMAT");

    let (status, _) = post(&app, "/api/toggle_account", json!({"id": "a1"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(std::fs::read_to_string(&app.path).unwrap(), "{ broken");
}

#[tokio::test]
async fn test_update_merges_shallowly() {
    let mut initial = example_document();
    initial["settings"] = json!({"currency": "EUR", "theme": "light"});
    let app = setup_test_app(Some(initial));

    let (status, body) = post(&app, "/api/update", json!({"settings": {"theme": "dark"}})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["settings"], json!({"theme": "dark"}));
    assert_eq!(body["data"]["accounts"][0]["id"], "a1");

    let saved = on_disk(&app.path);
    assert_eq!(saved["settings"], json!({"theme": "dark"}));
    assert_eq!(saved["accounts"], body["data"]["accounts"]);
}

#[tokio::test]
async fn test_update_keeps_sparse_accounts_as_stored() {
    let accounts = json!([{"id": "a1", "balance": 100}]);
    let app = setup_test_app(Some(json!({"accounts": accounts, "transactions": []})));

    let (status, body) = post(&app, "/api/update", json!({"x": 1})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["accounts"], accounts);

    let saved = on_disk(&app.path);
    assert_eq!(saved["accounts"], accounts);
    assert_eq!(saved["x"], 1);
}

#[tokio::test]
async fn test_update_rejects_non_object() {
    let app = setup_test_app(Some(example_document()));

    let (status, body) = post(&app, "/api/update", json!([1, 2, 3])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_invalid_json_body_is_client_error() {
    let app = setup_test_app(Some(example_document()));

    let (status, body) = post_raw(&app, "/api/add_transaction", "{not json").await;
    assert!(status.is_client_error());
    assert_eq!(body["status"], "error");
}

// ========== Transactions ==========

#[tokio::test]
async fn test_example_scenario() {
    let app = setup_test_app(Some(example_document()));

    let (status, body) = post(
        &app,
        "/api/add_transaction",
        json!({"account_id": "a1", "amount": 40, "type": "income"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["transaction"]["id"], 1);
    assert_eq!(body["transaction"]["account_id"], "a1");
    assert_eq!(body["transaction"]["amount"].as_f64(), Some(40.0));
    assert_eq!(body["transaction"]["type"], "income");
    assert_eq!(balance_of(&on_disk(&app.path), "a1"), 140.0);

    let (_, body) = post(
        &app,
        "/api/add_transaction",
        json!({"account_id": "a1", "amount": 10, "type": "expense"}),
    )
    .await;
    assert_eq!(body["transaction"]["id"], 2);
    assert_eq!(balance_of(&on_disk(&app.path), "a1"), 130.0);

    let (status, body) = post(&app, "/api/delete_account", json!({"id": "a1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success", "matched": true, "removed_transactions": 2}));

    let (_, data) = get(&app, "/api/data").await;
    assert_eq!(data["accounts"], json!([]));
    assert_eq!(data["transactions"], json!([]));
}

#[tokio::test]
async fn test_add_transaction_passes_extra_fields_through() {
    let app = setup_test_app(Some(example_document()));

    let (_, body) = post(
        &app,
        "/api/add_transaction",
        json!({"account_id": "a1", "amount": "12.5", "type": "expense", "date": "2024-06-01", "category": "food"}),
    )
    .await;
    assert_eq!(body["transaction"]["date"], "2024-06-01");
    assert_eq!(body["transaction"]["category"], "food");

    let saved = on_disk(&app.path);
    assert_eq!(saved["transactions"][0]["category"], "food");
    assert_eq!(balance_of(&saved, "a1"), 87.5);
}

#[tokio::test]
async fn test_add_transaction_unknown_account_still_recorded() {
    let app = setup_test_app(Some(example_document()));

    let (status, _) = post(
        &app,
        "/api/add_transaction",
        json!({"account_id": "ghost", "amount": 5, "type": "expense"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let saved = on_disk(&app.path);
    assert_eq!(saved["transactions"][0]["account_id"], "ghost");
    assert_eq!(balance_of(&saved, "a1"), 100.0);
}

#[tokio::test]
async fn test_add_transaction_validation() {
    let app = setup_test_app(Some(example_document()));
    let before = std::fs::read_to_string(&app.path).unwrap();

    for body in [
        json!({"account_id": "a1", "type": "income"}),
        json!({"account_id": "a1", "amount": "lots", "type": "income"}),
        json!({"amount": 1, "type": "income"}),
        json!({"account_id": "a1", "amount": 1}),
    ] {
        let (status, response) = post(&app, "/api/add_transaction", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"]["code"], "VALIDATION_ERROR");
    }

    assert_eq!(std::fs::read_to_string(&app.path).unwrap(), before);
}

#[tokio::test]
async fn test_transaction_ids_survive_cascade_delete() {
    let mut initial = example_document();
    initial["accounts"]
        .as_array_mut()
        .unwrap()
        .push(json!({"id": "b2", "name": "Visa", "type": "credit", "balance": 0}));
    let app = setup_test_app(Some(initial));

    post(&app, "/api/add_transaction", json!({"account_id": "a1", "amount": 1, "type": "income"})).await;
    post(&app, "/api/add_transaction", json!({"account_id": "b2", "amount": 1, "type": "expense"})).await;
    post(&app, "/api/delete_account", json!({"id": "b2"})).await;

    let (_, body) = post(
        &app,
        "/api/add_transaction",
        json!({"account_id": "a1", "amount": 1, "type": "income"}),
    )
    .await;
    assert_eq!(body["transaction"]["id"], 3);
}

// ========== Accounts ==========

#[tokio::test]
async fn test_add_account() {
    let app = setup_test_app(Some(example_document()));

    let (status, body) = post(
        &app,
        "/api/add_account",
        json!({"name": "Rainy Day", "type": "savings", "balance": "250"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account"]["id"], "rainy_day_2");
    assert_eq!(body["account"]["active"], false);
    assert_eq!(body["account"]["budget_limit"].as_f64(), Some(10000.0));
    assert_eq!(body["account"]["balance"].as_f64(), Some(250.0));

    let saved = on_disk(&app.path);
    assert_eq!(saved["accounts"][1]["id"], "rainy_day_2");
}

#[tokio::test]
async fn test_add_account_validation() {
    let app = setup_test_app(Some(example_document()));

    let (status, body) = post(&app, "/api/add_account", json!({"name": "Cash", "type": "cash"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("balance"));

    let (status, _) = post(
        &app,
        "/api/add_account",
        json!({"name": "Cash", "type": "cash", "balance": "a lot"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_toggle_account() {
    let mut initial = example_document();
    initial["accounts"]
        .as_array_mut()
        .unwrap()
        .push(json!({"id": "b2", "name": "Visa", "type": "credit", "balance": 0, "active": true}));
    let app = setup_test_app(Some(initial));

    let (status, body) = post(&app, "/api/toggle_account", json!({"id": "a1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success", "matched": true}));

    let saved = on_disk(&app.path);
    let active: Vec<&Value> = saved["accounts"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|a| a["active"] == true)
        .collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["id"], "a1");

    let (_, body) = post(&app, "/api/toggle_account", json!({"id": "nobody"})).await;
    assert_eq!(body["matched"], false);
    let saved = on_disk(&app.path);
    assert!(saved["accounts"].as_array().unwrap().iter().all(|a| a["active"] == false));
}

#[tokio::test]
async fn test_delete_unknown_account_is_noop() {
    let app = setup_test_app(Some(example_document()));
    let (_, before) = get(&app, "/api/data").await;

    let (status, body) = post(&app, "/api/delete_account", json!({"id": "nobody"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matched"], false);

    let (_, after) = get(&app, "/api/data").await;
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_delete_unknown_account_removes_orphan_transactions() {
    let mut initial = example_document();
    initial["transactions"] = json!([{"id": 1, "account_id": "ghost", "amount": 5, "type": "expense"}]);
    let app = setup_test_app(Some(initial));

    let (status, body) = post(&app, "/api/delete_account", json!({"id": "ghost"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success", "matched": false, "removed_transactions": 1}));

    let saved = on_disk(&app.path);
    assert_eq!(saved["accounts"][0]["id"], "a1");
    assert_eq!(saved["transactions"], json!([]));
}

#[tokio::test]
async fn test_array_bodies_are_rejected() {
    let app = setup_test_app(Some(example_document()));
    let before = std::fs::read_to_string(&app.path).unwrap();

    for (uri, body) in [
        ("/api/add_account", json!(["Cash", "cash", 5])),
        ("/api/toggle_account", json!(["a1"])),
        ("/api/delete_account", json!(["a1"])),
        ("/api/update_budget", json!(["a1", 10])),
    ] {
        let (status, response) = post(&app, uri, body).await;
        assert!(status.is_client_error(), "{} accepted an array body", uri);
        assert_eq!(response["status"], "error");
    }

    assert_eq!(std::fs::read_to_string(&app.path).unwrap(), before);
}

#[tokio::test]
async fn test_update_budget() {
    let app = setup_test_app(Some(example_document()));

    let (status, body) = post(
        &app,
        "/api/update_budget",
        json!({"account_id": "a1", "new_limit": 1200}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matched"], true);
    assert_eq!(on_disk(&app.path)["accounts"][0]["budget_limit"].as_f64(), Some(1200.0));

    let (status, _) = post(&app, "/api/update_budget", json!({"account_id": "a1"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
