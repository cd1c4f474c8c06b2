//! Shared helpers for HTTP integration tests.
//!
//! Builds a router over an in-memory store with a controllable clock and
//! drives it with single requests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use localize_api::{create_router, AppState};
use localize_core::{MemoryStore, TestClock};
use serde_json::Value;
use tower::ServiceExt;

/// Router plus handles on the store and clock behind it.
pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub clock: TestClock,
}

impl TestApp {
    pub fn new() -> Self {
        let clock = TestClock::with_start_time(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        let store = MemoryStore::with_clock(Arc::new(clock.clone()));
        let state = AppState::new(Arc::new(store.clone())).with_clock(Arc::new(clock.clone()));

        Self { router: create_router(state), store, clock }
    }

    /// Sends one request and returns the status and parsed JSON body.
    ///
    /// Empty bodies parse as `Value::Null`.
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.expect("failed to make request");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body should be valid JSON")
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, None).await
    }

    /// Creates a key and returns its id.
    pub async fn create_key(&self, key: &str, category: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/translation-keys",
                Some(serde_json::json!({ "key": key, "category": category })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
        body["id"].as_str().expect("id should be a string").to_string()
    }
}

/// Asserts an error body carries the expected code.
pub fn assert_error_code(body: &Value, code: &str) {
    assert_eq!(body["error"]["code"], code, "unexpected error body: {body}");
    assert!(body["error"]["message"].is_string(), "error message missing: {body}");
}
