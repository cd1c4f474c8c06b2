//! In-memory translation store.
//!
//! Mirrors the PostgreSQL store's observable behaviour (generated ids,
//! unique keys, store-owned timestamps, merge-on-update) so the HTTP layer
//! can be tested without a database. Supports injecting a failure for the
//! next call.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::TranslationStore;
use crate::{
    error::{CoreError, Result},
    models::{
        ListFilter, NewTranslationKey, TranslationKey, TranslationKeyId, TranslationKeyPatch,
        Translations,
    },
    time::{Clock, RealClock},
};

/// Translation store holding rows in insertion order.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    rows: Arc<RwLock<Vec<TranslationKey>>>,
    clock: Arc<dyn Clock>,
    injected_error: Arc<RwLock<Option<String>>>,
}

impl MemoryStore {
    /// Creates an empty store stamping rows with the real clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(RealClock::new()))
    }

    /// Creates an empty store stamping rows with the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(Vec::new())),
            clock,
            injected_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Makes the next store call fail with `CoreError::Database`.
    pub async fn inject_error(&self, message: impl Into<String>) {
        *self.injected_error.write().await = Some(message.into());
    }

    /// Returns the number of stored keys.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Returns true if no keys are stored.
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    async fn take_injected_error(&self) -> Result<()> {
        match self.injected_error.write().await.take() {
            Some(message) => Err(CoreError::Database(message)),
            None => Ok(()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn duplicate_key(key: &str) -> CoreError {
    CoreError::ConstraintViolation(format!(
        "unique constraint violation: key '{key}' already exists"
    ))
}

#[async_trait]
impl TranslationStore for MemoryStore {
    async fn find_by_id(&self, id: TranslationKeyId) -> Result<Option<TranslationKey>> {
        self.take_injected_error().await?;
        Ok(self.rows.read().await.iter().find(|row| row.id == id).cloned())
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<TranslationKey>> {
        self.take_injected_error().await?;

        let offset = usize::try_from(filter.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(filter.limit).unwrap_or(0);

        Ok(self
            .rows
            .read()
            .await
            .iter()
            .filter(|row| filter.matches(row))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn create(&self, new_key: &NewTranslationKey) -> Result<TranslationKey> {
        self.take_injected_error().await?;

        let mut rows = self.rows.write().await;
        if rows.iter().any(|row| row.key == new_key.key) {
            return Err(duplicate_key(&new_key.key));
        }

        let now = self.clock.now_utc();
        let record = TranslationKey {
            id: TranslationKeyId::new(),
            key: new_key.key.clone(),
            category: new_key.category.clone(),
            description: new_key.description.clone(),
            translations: Translations::new(),
            created_at: now,
            updated_at: now,
        };
        rows.push(record.clone());

        Ok(record)
    }

    async fn update(
        &self,
        id: TranslationKeyId,
        patch: &TranslationKeyPatch,
    ) -> Result<Option<TranslationKey>> {
        self.take_injected_error().await?;

        let mut rows = self.rows.write().await;

        // A missing row wins over a key conflict, as with `UPDATE ... WHERE id`.
        let Some(index) = rows.iter().position(|row| row.id == id) else {
            return Ok(None);
        };

        if let Some(key) = &patch.key {
            if rows.iter().any(|row| row.id != id && &row.key == key) {
                return Err(duplicate_key(key));
            }
        }

        let record = &mut rows[index];
        patch.apply_to(record);
        record.updated_at = self.clock.now_utc();

        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: TranslationKeyId) -> Result<bool> {
        self.take_injected_error().await?;

        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| row.id != id);

        Ok(rows.len() < before)
    }

    async fn all_translations(&self) -> Result<Vec<Translations>> {
        self.take_injected_error().await?;
        Ok(self.rows.read().await.iter().map(|row| row.translations.clone()).collect())
    }

    async fn health_check(&self) -> Result<()> {
        self.take_injected_error().await
    }
}
