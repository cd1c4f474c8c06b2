//! Storage abstraction for translation keys.
//!
//! Every read and write of the `translation_keys` table goes through
//! [`TranslationStore`]. The HTTP layer only sees the trait, so handlers can
//! be exercised against [`memory::MemoryStore`] without a database while
//! production runs on [`postgres::PgTranslationStore`].

use async_trait::async_trait;

use crate::{
    error::Result,
    models::{
        ListFilter, NewTranslationKey, TranslationKey, TranslationKeyId, TranslationKeyPatch,
        Translations,
    },
};

pub mod memory;
pub mod postgres;

/// Operations on the translation key table.
///
/// Uniqueness of `key` and maintenance of `updated_at` belong to the
/// implementation: a duplicate key surfaces as
/// `CoreError::ConstraintViolation`.
#[async_trait]
pub trait TranslationStore: Send + Sync + std::fmt::Debug {
    /// Finds a key by id.
    async fn find_by_id(&self, id: TranslationKeyId) -> Result<Option<TranslationKey>>;

    /// Lists keys matching the filter, ordered by creation time.
    async fn list(&self, filter: &ListFilter) -> Result<Vec<TranslationKey>>;

    /// Inserts a key with empty translations and returns the stored row.
    async fn create(&self, new_key: &NewTranslationKey) -> Result<TranslationKey>;

    /// Applies a partial update, merging translations.
    ///
    /// Returns `None` when no key has the given id.
    async fn update(
        &self,
        id: TranslationKeyId,
        patch: &TranslationKeyPatch,
    ) -> Result<Option<TranslationKey>>;

    /// Deletes a key. Returns false when no key has the given id.
    async fn delete(&self, id: TranslationKeyId) -> Result<bool>;

    /// Returns the translations map of every key.
    async fn all_translations(&self) -> Result<Vec<Translations>>;

    /// Verifies the store is reachable.
    async fn health_check(&self) -> Result<()>;
}
