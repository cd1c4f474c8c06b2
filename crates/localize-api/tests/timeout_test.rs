//! Request timeout enforcement.
//!
//! Wraps the in-memory store with a slow health check so the router's
//! timeout layer has something to cut off.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{body::Body, http::Request, http::StatusCode};
use localize_api::{create_router_with_timeout, AppState};
use localize_core::{
    ListFilter, MemoryStore, NewTranslationKey, Result, TranslationKey, TranslationKeyId,
    TranslationKeyPatch, TranslationStore, Translations,
};
use tower::ServiceExt;

/// Delegates to a memory store but stalls on health checks.
#[derive(Debug)]
struct SlowHealthStore {
    inner: MemoryStore,
    delay: Duration,
}

#[async_trait]
impl TranslationStore for SlowHealthStore {
    async fn find_by_id(&self, id: TranslationKeyId) -> Result<Option<TranslationKey>> {
        self.inner.find_by_id(id).await
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<TranslationKey>> {
        self.inner.list(filter).await
    }

    async fn create(&self, new_key: &NewTranslationKey) -> Result<TranslationKey> {
        self.inner.create(new_key).await
    }

    async fn update(
        &self,
        id: TranslationKeyId,
        patch: &TranslationKeyPatch,
    ) -> Result<Option<TranslationKey>> {
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: TranslationKeyId) -> Result<bool> {
        self.inner.delete(id).await
    }

    async fn all_translations(&self) -> Result<Vec<Translations>> {
        self.inner.all_translations().await
    }

    async fn health_check(&self) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.health_check().await
    }
}

fn router(timeout: Duration, delay: Duration) -> axum::Router {
    let store = SlowHealthStore { inner: MemoryStore::new(), delay };
    create_router_with_timeout(AppState::new(Arc::new(store)), timeout)
}

fn health_request() -> Request<Body> {
    Request::builder().uri("/health").body(Body::empty()).unwrap()
}

#[tokio::test]
async fn slow_request_is_cut_off_with_request_timeout() {
    let app = router(Duration::from_millis(50), Duration::from_secs(5));

    let response = app.oneshot(health_request()).await.expect("failed to make request");

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
}

#[tokio::test]
async fn request_within_timeout_completes() {
    let app = router(Duration::from_secs(5), Duration::from_millis(10));

    let response = app.oneshot(health_request()).await.expect("failed to make request");

    assert_eq!(response.status(), StatusCode::OK);
}
