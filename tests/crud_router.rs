mod common;

use autocrud::{CrudRoute, CrudRouter, MemoryStorage};
use axum::http::StatusCode;
use common::{send, Item};
use serde_json::json;
use std::sync::Arc;

fn app() -> axum::Router {
    CrudRouter::<Item, MemoryStorage<Item>>::new(MemoryStorage::new())
        .build()
        .unwrap()
}

#[tokio::test]
async fn create_then_get_round_trip() {
    let app = app();
    let (status, created) = send(&app, "POST", "/", Some(json!({ "name": "pen", "price": 1.5, "in_stock": true })), &[]).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "pen");
    let id = created["id"].as_str().unwrap().to_string();
    assert!(uuid::Uuid::parse_str(&id).is_ok());

    let (status, fetched) = send(&app, "GET", &format!("/{}", id), None, &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn update_preserves_unset_fields() {
    let app = app();
    let (_, created) = send(&app, "POST", "/", Some(json!({ "name": "pen", "price": 1.5, "in_stock": true })), &[]).await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = send(&app, "PUT", &format!("/{}", id), Some(json!({ "price": 2.0 })), &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], 2.0);
    assert_eq!(updated["name"], "pen");
    assert_eq!(updated["in_stock"], true);
    assert_eq!(updated["id"], created["id"]);
}

#[tokio::test]
async fn delete_removes_item() {
    let app = app();
    let (_, created) = send(&app, "POST", "/", Some(json!({ "name": "pen", "price": 1.5, "in_stock": true })), &[]).await;
    let path = format!("/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&app, "DELETE", &path, None, &[]).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, body) = send(&app, "GET", &path, None, &[]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    // Deleting again is a no-op.
    let (status, _) = send(&app, "DELETE", &path, None, &[]).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn list_reflects_prior_creates_in_order() {
    let app = app();
    let (_, empty) = send(&app, "GET", "/", None, &[]).await;
    assert_eq!(empty, json!([]));
    for name in ["a", "b", "c"] {
        send(&app, "POST", "/", Some(json!({ "name": name, "price": 1.0, "in_stock": false })), &[]).await;
    }
    let (status, list) = send(&app, "GET", "/", None, &[]).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = list.as_array().unwrap().iter().map(|i| i["name"].clone()).collect();
    assert_eq!(names, vec![json!("a"), json!("b"), json!("c")]);
}

#[tokio::test]
async fn update_of_missing_item_is_not_found() {
    let app = app();
    let path = format!("/{}", uuid::Uuid::new_v4());
    let (status, _) = send(&app, "PUT", &path, Some(json!({ "name": "x" })), &[]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_ids_and_bodies() {
    let app = app();
    let (status, body) = send(&app, "GET", "/not-a-uuid", None, &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "bad request: invalid id: not-a-uuid");

    let (status, _) = send(&app, "POST", "/", Some(json!({ "name": "pen" })), &[]).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, "POST", "/", None, &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn disabled_operations_are_not_routed() {
    let storage = Arc::new(MemoryStorage::<Item>::new());
    let app = CrudRouter::<Item, MemoryStorage<Item>>::new(storage.clone())
        .operations(&[CrudRoute::List, CrudRoute::Get])
        .build()
        .unwrap();

    let (status, _) = send(&app, "POST", "/", Some(json!({ "name": "pen", "price": 1.0, "in_stock": true })), &[]).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    let path = format!("/{}", uuid::Uuid::new_v4());
    let (status, _) = send(&app, "DELETE", &path, None, &[]).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    let (status, _) = send(&app, "GET", &path, None, &[]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(storage.is_empty().await);

    assert!(CrudRouter::<Item, MemoryStorage<Item>>::new(MemoryStorage::new())
        .operations(&[])
        .build()
        .is_err());
}

#[tokio::test]
async fn prefix_nests_routes() {
    let app = CrudRouter::<Item, MemoryStorage<Item>>::new(MemoryStorage::new())
        .prefix("/items")
        .build()
        .unwrap();
    let (status, created) = send(&app, "POST", "/items", Some(json!({ "name": "pen", "price": 1.0, "in_stock": true })), &[]).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, "GET", &format!("/items/{}", created["id"].as_str().unwrap()), None, &[]).await;
    assert_eq!(status, StatusCode::OK);
}

fn prefix_error(prefix: &str) -> String {
    match CrudRouter::<Item, MemoryStorage<Item>>::new(MemoryStorage::new())
        .prefix(prefix)
        .build()
    {
        Ok(_) => panic!("prefix '{}' should be rejected", prefix),
        Err(e) => e.to_string(),
    }
}

#[test]
fn malformed_prefixes_are_config_errors() {
    assert_eq!(prefix_error("items"), "validation: prefix 'items' must start with '/'");
    assert_eq!(prefix_error("/"), "validation: prefix must not be '/'");
}

#[tokio::test]
async fn empty_prefix_mounts_at_root() {
    let app = CrudRouter::<Item, MemoryStorage<Item>>::new(MemoryStorage::new())
        .prefix("")
        .build()
        .unwrap();
    let (status, list) = send(&app, "GET", "/", None, &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn body_limit_rejects_large_payloads() {
    let app = CrudRouter::<Item, MemoryStorage<Item>>::new(MemoryStorage::new())
        .body_limit(16)
        .build()
        .unwrap();
    let big = json!({ "name": "x".repeat(64), "price": 1.0, "in_stock": true });
    let len = big.to_string().len().to_string();
    let (status, _) = send(&app, "POST", "/", Some(big), &[("content-length", len.as_str())]).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn common_routes_report_health() {
    let app = autocrud::common_routes();
    let (status, body) = send(&app, "GET", "/health", None, &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
    let (_, body) = send(&app, "GET", "/version", None, &[]).await;
    assert_eq!(body["name"], "autocrud");
}
