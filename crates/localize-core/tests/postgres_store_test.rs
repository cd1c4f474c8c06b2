//! PostgreSQL store tests.
//!
//! These run against the database named by `DATABASE_URL` and are ignored
//! by default:
//!
//! ```text
//! DATABASE_URL=postgresql://localhost/localize_test cargo test -- --ignored
//! ```
//!
//! Each test uses keys prefixed with a random run id so tests can share one
//! database.

use localize_core::{
    ListFilter, NewTranslationKey, PgTranslationStore, Translation, TranslationKeyId,
    TranslationKeyPatch, TranslationStore, Translations,
};
use sqlx::PgPool;
use uuid::Uuid;

async fn store() -> PgTranslationStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await.expect("failed to connect to database");
    let store = PgTranslationStore::new(pool);
    store.ensure_schema().await.expect("failed to ensure schema");
    store
}

fn unique(prefix: &str) -> String {
    format!("{prefix}.{}", Uuid::new_v4().simple())
}

fn new_key(key: &str, category: &str) -> NewTranslationKey {
    NewTranslationKey { key: key.to_string(), category: category.to_string(), description: None }
}

#[tokio::test]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn ensure_schema_is_idempotent() {
    let store = store().await;
    store.ensure_schema().await.expect("second schema run should succeed");
    store.health_check().await.expect("health check should pass");
}

#[tokio::test]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn create_then_duplicate_is_unique_violation() {
    let store = store().await;
    let key = unique("dup");

    let created = store.create(&new_key(&key, "tests")).await.expect("first create");
    assert_eq!(created.key, key);
    assert!(created.translations.is_empty());

    let err = store.create(&new_key(&key, "tests")).await.unwrap_err();
    assert!(err.is_unique_violation(), "expected unique violation, got {err:?}");

    store.delete(created.id).await.expect("cleanup");
}

#[tokio::test]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn update_merges_translations_and_bumps_updated_at() {
    let store = store().await;
    let created = store.create(&new_key(&unique("merge"), "tests")).await.unwrap();

    let entry = |value: &str| Translation {
        value: value.to_string(),
        updated_at: chrono::Utc::now(),
        updated_by: "pg-test".to_string(),
    };

    store
        .update(
            created.id,
            &TranslationKeyPatch::merge_translations(Translations::from([(
                "en".to_string(),
                entry("Hello"),
            )])),
        )
        .await
        .unwrap();
    let updated = store
        .update(
            created.id,
            &TranslationKeyPatch {
                description: Some(Some("greeting".into())),
                translations: Some(Translations::from([("de".to_string(), entry("Hallo"))])),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .expect("row should exist");

    assert_eq!(updated.translations["en"].value, "Hello");
    assert_eq!(updated.translations["de"].value, "Hallo");
    assert_eq!(updated.description.as_deref(), Some("greeting"));
    assert!(updated.updated_at >= created.updated_at);

    store.delete(created.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn list_filters_and_escapes_search() {
    let store = store().await;
    let category = unique("cat");
    let a = store.create(&new_key(&unique("100%done"), &category)).await.unwrap();
    let b = store.create(&new_key(&unique("100xdone"), &category)).await.unwrap();

    let filter = ListFilter::new(Some(category.clone()), None, None, None).unwrap();
    assert_eq!(store.list(&filter).await.unwrap().len(), 2);

    let filter = ListFilter::new(Some(category), Some("100%D".into()), None, None).unwrap();
    let found = store.list(&filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, a.id);

    store.delete(a.id).await.unwrap();
    store.delete(b.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn missing_rows_report_absent() {
    let store = store().await;
    let id = TranslationKeyId::new();

    assert!(store.find_by_id(id).await.unwrap().is_none());
    assert!(store.update(id, &TranslationKeyPatch::default()).await.unwrap().is_none());
    assert!(!store.delete(id).await.unwrap());
}
