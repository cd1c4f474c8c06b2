//! Translation key models and strongly-typed identifiers.
//!
//! Defines the single translation key entity, its per-language values, the
//! write models accepted by stores, and the list filter used for paging.

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use uuid::Uuid;

use crate::error::{CoreError, Result};

type PgDb = sqlx::Postgres;
type PgRow = sqlx::postgres::PgRow;
type PgValueRef<'r> = sqlx::postgres::PgValueRef<'r>;
type PgTypeInfo = sqlx::postgres::PgTypeInfo;
type PgArgumentBuffer = sqlx::postgres::PgArgumentBuffer;
type EncodeResult =
    std::result::Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync + 'static>>;
type BoxDynError = sqlx::error::BoxDynError;

/// Default and maximum page size for key listings.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Strongly-typed translation key identifier.
///
/// Generated by the store on insert. Serializes as the bare UUID string.
///
/// # Example
///
/// ```
/// use localize_core::models::TranslationKeyId;
///
/// let id: TranslationKeyId = "0b6f1c1e-8a55-4d3f-9d0e-5d8f3a1c2b4e".parse().unwrap();
/// assert_eq!(id.to_string(), "0b6f1c1e-8a55-4d3f-9d0e-5d8f3a1c2b4e");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TranslationKeyId(pub Uuid);

impl TranslationKeyId {
    /// Creates a new random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TranslationKeyId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TranslationKeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for TranslationKeyId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for TranslationKeyId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| CoreError::InvalidInput(format!("'{s}' is not a valid translation key id")))
    }
}

impl sqlx::Type<PgDb> for TranslationKeyId {
    fn type_info() -> PgTypeInfo {
        <Uuid as sqlx::Type<PgDb>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, PgDb> for TranslationKeyId {
    fn decode(value: PgValueRef<'r>) -> std::result::Result<Self, BoxDynError> {
        let uuid = <Uuid as sqlx::Decode<PgDb>>::decode(value)?;
        Ok(Self(uuid))
    }
}

impl sqlx::Encode<'_, PgDb> for TranslationKeyId {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> EncodeResult {
        <Uuid as sqlx::Encode<PgDb>>::encode_by_ref(&self.0, buf)
    }
}

/// A single language's value for a translation key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    /// Translated text. An empty string counts as untranslated.
    pub value: String,
    /// When this value was last written.
    pub updated_at: DateTime<Utc>,
    /// Who last wrote this value.
    pub updated_by: String,
}

impl Translation {
    /// Returns true if the translation carries a non-empty value.
    pub fn is_populated(&self) -> bool {
        !self.value.is_empty()
    }
}

/// Per-language translations keyed by language code.
///
/// Ordered so that responses and statistics are deterministic.
pub type Translations = BTreeMap<String, Translation>;

/// A named, categorized entry whose value may differ per language code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationKey {
    /// Store-generated identifier.
    pub id: TranslationKeyId,
    /// Unique key text, e.g. `button.save`.
    pub key: String,
    /// Grouping category, e.g. `buttons`.
    pub category: String,
    /// Optional free-form description for translators.
    pub description: Option<String>,
    /// Values per language code.
    #[serde(default)]
    pub translations: Translations,
    /// When the row was inserted.
    pub created_at: DateTime<Utc>,
    /// When the row was last modified. Maintained by the store.
    pub updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for TranslationKey {
    fn from_row(row: &'r PgRow) -> std::result::Result<Self, sqlx::Error> {
        let translations: sqlx::types::Json<Translations> = row.try_get("translations")?;

        Ok(Self {
            id: row.try_get("id")?,
            key: row.try_get("key")?,
            category: row.try_get("category")?,
            description: row.try_get("description")?,
            translations: translations.0,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Fields required to create a translation key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTranslationKey {
    /// Unique key text.
    pub key: String,
    /// Grouping category.
    pub category: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

impl NewTranslationKey {
    /// Checks that the required fields are present and not blank.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInput` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        require_non_blank("key", &self.key)?;
        require_non_blank("category", &self.category)
    }
}

/// Partial update of a translation key.
///
/// `None` leaves a field unchanged. `description: Some(None)` clears the
/// description. Entries in `translations` are merged into the existing
/// map: named languages are replaced, all others are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationKeyPatch {
    /// New key text.
    pub key: Option<String>,
    /// New category.
    pub category: Option<String>,
    /// New description, or `Some(None)` to clear it.
    pub description: Option<Option<String>>,
    /// Language entries to merge.
    pub translations: Option<Translations>,
}

impl TranslationKeyPatch {
    /// Builds a patch that only merges translations.
    pub fn merge_translations(translations: Translations) -> Self {
        Self { translations: Some(translations), ..Self::default() }
    }

    /// Checks that any supplied key or category is not blank.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInput` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if let Some(key) = &self.key {
            require_non_blank("key", key)?;
        }
        if let Some(category) = &self.category {
            require_non_blank("category", category)?;
        }
        Ok(())
    }

    /// Applies the patch to an in-memory record.
    ///
    /// Does not touch `updated_at`; stores own that column.
    pub fn apply_to(&self, record: &mut TranslationKey) {
        if let Some(key) = &self.key {
            record.key.clone_from(key);
        }
        if let Some(category) = &self.category {
            record.category.clone_from(category);
        }
        if let Some(description) = &self.description {
            record.description.clone_from(description);
        }
        if let Some(translations) = &self.translations {
            for (language, translation) in translations {
                record.translations.insert(language.clone(), translation.clone());
            }
        }
    }
}

/// Filter and paging parameters for listing translation keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilter {
    /// Exact category match.
    pub category: Option<String>,
    /// Case-insensitive substring match on the key.
    pub search: Option<String>,
    /// Page size, `1..=MAX_PAGE_SIZE`.
    pub limit: i64,
    /// Rows to skip, `>= 0`.
    pub offset: i64,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self { category: None, search: None, limit: MAX_PAGE_SIZE, offset: 0 }
    }
}

impl ListFilter {
    /// Builds a filter, applying defaults and validating paging bounds.
    ///
    /// Empty `category` or `search` strings are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInput` if `limit` is outside
    /// `1..=MAX_PAGE_SIZE` or `offset` is negative.
    pub fn new(
        category: Option<String>,
        search: Option<String>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Self> {
        let limit = limit.unwrap_or(MAX_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(CoreError::InvalidInput(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        let offset = offset.unwrap_or(0);
        if offset < 0 {
            return Err(CoreError::InvalidInput("offset must be greater than or equal to 0".into()));
        }

        Ok(Self {
            category: category.filter(|c| !c.is_empty()),
            search: search.filter(|s| !s.is_empty()),
            limit,
            offset,
        })
    }

    /// Returns true if the record satisfies the category and search filters.
    pub fn matches(&self, record: &TranslationKey) -> bool {
        let category_ok = self.category.as_deref().map_or(true, |c| record.category == c);
        let search_ok = self
            .search
            .as_deref()
            .map_or(true, |s| record.key.to_lowercase().contains(&s.to_lowercase()));
        category_ok && search_ok
    }

    /// Returns the search term as an `ILIKE` pattern with wildcards escaped.
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_deref().map(|s| {
            let escaped = s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
            format!("%{escaped}%")
        })
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CoreError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(())
}
