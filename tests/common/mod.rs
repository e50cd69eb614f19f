#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use serde_json::Value;
use sheet_ledger::{
    api,
    sheets::{MemorySheets, StoreHandle},
    utils::app_config::AppConfig,
};
use tower::ServiceExt;

/// An empty ledger plus a handle on its backing sheets for assertions.
pub async fn test_app() -> (AppConfig, MemorySheets) {
    let app_config = AppConfig::in_memory().await;
    let sheets = match &app_config.store {
        StoreHandle::Memory(sheets) => sheets.clone(),
        StoreHandle::Google(_) => unreachable!("in_memory always builds a memory store"),
    };
    (app_config, sheets)
}

pub async fn test_router() -> (Router, MemorySheets) {
    let (app_config, sheets) = test_app().await;
    (api::router(app_config, None), sheets)
}

pub async fn send(router: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(text) => {
            builder = builder.header("content-type", "application/json");
            Body::from(text.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, json)
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(router, Method::GET, uri, None).await
}

pub async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(router, Method::POST, uri, Some(&body.to_string())).await
}

/// Rows of a tab without the header row.
pub async fn data_rows(sheets: &MemorySheets, title: &str) -> Vec<Vec<String>> {
    let mut rows = sheets.snapshot(title).await.unwrap();
    rows.remove(0);
    rows
}
