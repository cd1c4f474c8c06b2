//! Integration tests for the completion statistics endpoint.

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

async fn set_translations(app: &TestApp, id: &str, translations: serde_json::Value) {
    let (status, body) = app
        .send(
            "PATCH",
            &format!("/translation-keys/{id}"),
            Some(json!({ "translations": translations })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "patch failed: {body}");
}

#[tokio::test]
async fn no_keys_yields_empty_report() {
    let app = TestApp::new();

    let (status, body) = app.get("/translation-keys/stats/completion").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn keys_without_translations_yield_empty_report() {
    let app = TestApp::new();
    app.create_key("button.save", "buttons").await;

    let (status, body) = app.get("/translation-keys/stats/completion").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn reports_percentage_per_language() {
    let app = TestApp::new();
    let first = app.create_key("button.save", "buttons").await;
    let second = app.create_key("button.cancel", "buttons").await;

    set_translations(
        &app,
        &first,
        json!({
            "en": { "value": "Save", "updated_by": "ana" },
            "es": { "value": "Guardar", "updated_by": "ana" }
        }),
    )
    .await;
    set_translations(&app, &second, json!({ "en": { "value": "Cancel", "updated_by": "ana" } }))
        .await;

    let (status, body) = app.get("/translation-keys/stats/completion").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["en"], 100.0);
    assert_eq!(body["es"], 50.0);
}

#[tokio::test]
async fn empty_values_count_as_missing() {
    let app = TestApp::new();
    let id = app.create_key("greeting", "common").await;

    set_translations(&app, &id, json!({ "de": { "value": "", "updated_by": "ana" } })).await;

    let (status, body) = app.get("/translation-keys/stats/completion").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["de"], 0.0);
}

#[tokio::test]
async fn stats_route_is_not_treated_as_an_id() {
    let app = TestApp::new();

    let (status, body) = app.get("/translation-keys/stats/completion").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_object());
    assert!(body.get("error").is_none());
}
