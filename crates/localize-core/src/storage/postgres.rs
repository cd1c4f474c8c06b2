//! PostgreSQL implementation of the translation store.
//!
//! One statement per operation. Translation merges use JSONB concatenation
//! so concurrent merges of different languages do not overwrite each other.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use tracing::debug;

use super::TranslationStore;
use crate::{
    error::Result,
    models::{
        ListFilter, NewTranslationKey, TranslationKey, TranslationKeyId, TranslationKeyPatch,
        Translations,
    },
};

const COLUMNS: &str = "id, key, category, description, translations, created_at, updated_at";

/// Statements that bring an empty database up to the current schema.
///
/// Each statement is idempotent. `updated_at` is owned by a trigger.
const SCHEMA: &[(&str, &str)] = &[
    (
        "translation_keys table",
        r"
        CREATE TABLE IF NOT EXISTS translation_keys (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            key TEXT NOT NULL,
            category TEXT NOT NULL,
            description TEXT,
            translations JSONB NOT NULL DEFAULT '{}'::jsonb,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CONSTRAINT translation_keys_key_key UNIQUE (key)
        )
        ",
    ),
    (
        "updated_at trigger function",
        r"
        CREATE OR REPLACE FUNCTION translation_keys_set_updated_at()
        RETURNS TRIGGER AS $$
        BEGIN
            NEW.updated_at = NOW();
            RETURN NEW;
        END;
        $$ LANGUAGE plpgsql
        ",
    ),
    (
        "updated_at trigger",
        r"
        DO $$
        BEGIN
            IF NOT EXISTS (
                SELECT 1 FROM pg_trigger WHERE tgname = 'translation_keys_updated_at'
            ) THEN
                CREATE TRIGGER translation_keys_updated_at
                BEFORE UPDATE ON translation_keys
                FOR EACH ROW EXECUTE FUNCTION translation_keys_set_updated_at();
            END IF;
        END;
        $$
        ",
    ),
    (
        "category index",
        r"
        CREATE INDEX IF NOT EXISTS idx_translation_keys_category
        ON translation_keys(category)
        ",
    ),
];

/// Translation store backed by the `translation_keys` table.
#[derive(Debug, Clone)]
pub struct PgTranslationStore {
    pool: Arc<PgPool>,
}

impl PgTranslationStore {
    /// Creates a new store on the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Returns a reference to the database pool.
    pub fn pool(&self) -> Arc<PgPool> {
        self.pool.clone()
    }

    /// Creates the table, trigger and indexes if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Database` naming the statement that failed.
    pub async fn ensure_schema(&self) -> Result<()> {
        for (name, statement) in SCHEMA {
            debug!(step = name, "ensuring schema");
            sqlx::raw_sql(statement).execute(&*self.pool).await.map_err(|e| {
                crate::error::CoreError::Database(format!("failed to create {name}: {e}"))
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl TranslationStore for PgTranslationStore {
    async fn find_by_id(&self, id: TranslationKeyId) -> Result<Option<TranslationKey>> {
        let record = sqlx::query_as::<_, TranslationKey>(&format!(
            "SELECT {COLUMNS} FROM translation_keys WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(record)
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<TranslationKey>> {
        let records = sqlx::query_as::<_, TranslationKey>(&format!(
            r"
            SELECT {COLUMNS}
            FROM translation_keys
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::text IS NULL OR key ILIKE $2 ESCAPE '\')
            ORDER BY created_at ASC, id ASC
            LIMIT $3 OFFSET $4
            "
        ))
        .bind(filter.category.as_deref())
        .bind(filter.search_pattern())
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&*self.pool)
        .await?;

        Ok(records)
    }

    async fn create(&self, new_key: &NewTranslationKey) -> Result<TranslationKey> {
        let record = sqlx::query_as::<_, TranslationKey>(&format!(
            r"
            INSERT INTO translation_keys (key, category, description)
            VALUES ($1, $2, $3)
            RETURNING {COLUMNS}
            "
        ))
        .bind(&new_key.key)
        .bind(&new_key.category)
        .bind(&new_key.description)
        .fetch_one(&*self.pool)
        .await?;

        Ok(record)
    }

    async fn update(
        &self,
        id: TranslationKeyId,
        patch: &TranslationKeyPatch,
    ) -> Result<Option<TranslationKey>> {
        let record = sqlx::query_as::<_, TranslationKey>(&format!(
            r"
            UPDATE translation_keys SET
                key = COALESCE($2::text, key),
                category = COALESCE($3::text, category),
                description = CASE WHEN $4 THEN $5::text ELSE description END,
                translations = translations || COALESCE($6::jsonb, '{{}}'::jsonb)
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        ))
        .bind(id)
        .bind(patch.key.as_deref())
        .bind(patch.category.as_deref())
        .bind(patch.description.is_some())
        .bind(patch.description.clone().flatten())
        .bind(patch.translations.as_ref().map(Json))
        .fetch_optional(&*self.pool)
        .await?;

        Ok(record)
    }

    async fn delete(&self, id: TranslationKeyId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM translation_keys WHERE id = $1")
            .bind(id)
            .execute(&*self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn all_translations(&self) -> Result<Vec<Translations>> {
        let rows: Vec<(Json<Translations>,)> =
            sqlx::query_as("SELECT translations FROM translation_keys")
                .fetch_all(&*self.pool)
                .await?;

        Ok(rows.into_iter().map(|(translations,)| translations.0).collect())
    }

    async fn health_check(&self) -> Result<()> {
        let _: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&*self.pool).await?;
        Ok(())
    }
}
