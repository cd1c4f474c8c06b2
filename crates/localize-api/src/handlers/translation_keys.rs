//! Translation key CRUD, bulk update and completion statistics handlers.
//!
//! Each handler validates its input, performs one store call (bulk update
//! performs one per key) and shapes the result into JSON.

use std::collections::BTreeMap;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use localize_core::{
    models::ListFilter, stats, stats::CompletionStats, NewTranslationKey, Translation,
    TranslationKey, TranslationKeyId, TranslationKeyPatch, Translations,
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{error::ApiError, server::AppState};

/// Query parameters for listing translation keys.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Exact category match
    pub category: Option<String>,
    /// Case-insensitive substring of the key
    pub search: Option<String>,
    /// Page size, 1 to 100 (default 100)
    pub limit: Option<i64>,
    /// Rows to skip (default 0)
    pub offset: Option<i64>,
}

/// Body for creating a translation key.
#[derive(Debug, Deserialize)]
pub struct CreateTranslationKeyRequest {
    /// Unique key text
    pub key: String,
    /// Grouping category
    pub category: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

/// A translation value as supplied by clients.
#[derive(Debug, Deserialize)]
pub struct TranslationInput {
    /// Translated text
    pub value: String,
    /// Who is writing the value
    pub updated_by: String,
    /// Defaults to the time the request is handled
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body for partially updating a translation key.
///
/// Absent fields are left unchanged. `"description": null` clears the
/// description.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTranslationKeyRequest {
    /// New key text
    #[serde(default)]
    pub key: Option<String>,
    /// New category
    #[serde(default)]
    pub category: Option<String>,
    /// New description, or `null` to clear
    #[serde(default, deserialize_with = "deserialize_present")]
    pub description: Option<Option<String>>,
    /// Language entries to merge into the existing translations
    #[serde(default)]
    pub translations: Option<BTreeMap<String, TranslationInput>>,
}

/// Body for updating many keys' translations at once.
#[derive(Debug, Deserialize)]
pub struct BulkUpdateRequest {
    /// `{key_id: {language_code: value}}`
    pub translations: BTreeMap<String, BTreeMap<String, String>>,
    /// Recorded as `updated_by` on every written value
    pub updated_by: String,
}

/// Response from a successful bulk update.
#[derive(Debug, Serialize, Deserialize)]
pub struct BulkUpdateResponse {
    /// Human-readable outcome
    pub message: String,
    /// Number of keys that were updated
    pub updated: usize,
}

/// Distinguishes an explicit `null` from an absent field.
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Ids that are not UUIDs cannot name an existing key.
fn parse_id(raw: &str) -> Result<TranslationKeyId, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

/// Fetches a single translation key.
///
/// # Errors
///
/// - 404: No key with this id
/// - 500: Store failure
#[instrument(name = "get_translation_key", skip(state))]
pub async fn get_translation_key(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TranslationKey>, ApiError> {
    let id = parse_id(&id)?;
    let record = state.store.find_by_id(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(record))
}

/// Lists translation keys with optional filtering and paging.
///
/// # Errors
///
/// - 422: `limit` outside 1..=100, negative `offset`, or malformed query
/// - 500: Store failure
#[instrument(name = "list_translation_keys", skip(state, params))]
pub async fn list_translation_keys(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<TranslationKey>>, ApiError> {
    let Query(params) = params?;
    let filter = ListFilter::new(params.category, params.search, params.limit, params.offset)?;

    let records = state.store.list(&filter).await?;
    debug!(count = records.len(), "Listed translation keys");

    Ok(Json(records))
}

/// Creates a translation key with empty translations.
///
/// # Errors
///
/// - 409: The key text is already in use
/// - 422: Missing or blank `key` / `category`
/// - 500: Store failure
#[instrument(name = "create_translation_key", skip(state, payload))]
pub async fn create_translation_key(
    State(state): State<AppState>,
    payload: Result<Json<CreateTranslationKeyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TranslationKey>), ApiError> {
    let Json(request) = payload?;
    let new_key = NewTranslationKey {
        key: request.key,
        category: request.category,
        description: request.description,
    };
    new_key.validate()?;

    let record = state.store.create(&new_key).await.map_err(|e| {
        if e.is_unique_violation() {
            warn!(key = %new_key.key, "Translation key already exists");
        }
        ApiError::from_write(e, &new_key.key)
    })?;

    info!(id = %record.id, key = %record.key, "Created translation key");
    Ok((StatusCode::CREATED, Json(record)))
}

/// Partially updates a translation key, merging translations.
///
/// # Errors
///
/// - 404: No key with this id
/// - 409: The new key text is already in use
/// - 422: Malformed body or blank `key` / `category`
/// - 500: Store failure
#[instrument(name = "update_translation_key", skip(state, payload))]
pub async fn update_translation_key(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTranslationKeyRequest>, JsonRejection>,
) -> Result<Json<TranslationKey>, ApiError> {
    let id = parse_id(&id)?;
    let Json(request) = payload?;

    let now = state.clock.now_utc();
    let translations = request.translations.map(|entries| {
        entries
            .into_iter()
            .map(|(language, input)| {
                let translation = Translation {
                    value: input.value,
                    updated_at: input.updated_at.unwrap_or(now),
                    updated_by: input.updated_by,
                };
                (language, translation)
            })
            .collect::<Translations>()
    });

    let patch = TranslationKeyPatch {
        key: request.key,
        category: request.category,
        description: request.description,
        translations,
    };
    patch.validate()?;

    let record = state
        .store
        .update(id, &patch)
        .await
        .map_err(|e| ApiError::from_write(e, patch.key.as_deref().unwrap_or_default()))?
        .ok_or(ApiError::NotFound)?;

    info!(id = %record.id, "Updated translation key");
    Ok(Json(record))
}

/// Deletes a translation key.
///
/// # Errors
///
/// - 404: No key with this id
/// - 500: Store failure
#[instrument(name = "delete_translation_key", skip(state))]
pub async fn delete_translation_key(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;

    if !state.store.delete(id).await? {
        return Err(ApiError::NotFound);
    }

    info!(id = %id, "Deleted translation key");
    Ok(StatusCode::NO_CONTENT)
}

/// Merges values for many keys, stamping each with `updated_by` and now.
///
/// Unknown or malformed ids are skipped.
///
/// # Errors
///
/// - 400: No key was updated
/// - 422: Malformed body
/// - 500: Store failure
#[instrument(name = "bulk_update_translations", skip(state, payload))]
pub async fn bulk_update_translations(
    State(state): State<AppState>,
    payload: Result<Json<BulkUpdateRequest>, JsonRejection>,
) -> Result<Json<BulkUpdateResponse>, ApiError> {
    let Json(request) = payload?;
    let now = state.clock.now_utc();
    let mut updated = 0;

    for (raw_id, values) in request.translations {
        let Ok(id) = raw_id.parse::<TranslationKeyId>() else {
            warn!(key_id = %raw_id, "Skipping malformed translation key id in bulk update");
            continue;
        };

        let translations: Translations = values
            .into_iter()
            .map(|(language, value)| {
                let translation =
                    Translation { value, updated_at: now, updated_by: request.updated_by.clone() };
                (language, translation)
            })
            .collect();

        match state.store.update(id, &TranslationKeyPatch::merge_translations(translations)).await? {
            Some(_) => updated += 1,
            None => warn!(key_id = %id, "Translation key not found for bulk update"),
        }
    }

    if updated == 0 {
        return Err(ApiError::BulkUpdateFailed);
    }

    info!(updated, "Bulk translation update completed");
    Ok(Json(BulkUpdateResponse {
        message: "Translations updated successfully".to_string(),
        updated,
    }))
}

/// Answers id-style requests on a path segment reserved for another route.
///
/// No key id can equal a reserved segment, so these requests are `404`.
#[instrument(name = "reserved_translation_key_path")]
pub async fn reserved_path() -> ApiError {
    ApiError::NotFound
}

/// Reports completion percentage per language code.
///
/// # Errors
///
/// - 500: Store failure
#[instrument(name = "completion_stats", skip(state))]
pub async fn completion_stats(
    State(state): State<AppState>,
) -> Result<Json<CompletionStats>, ApiError> {
    let rows = state.store.all_translations().await?;
    let report = stats::completion(&rows);

    debug!(keys = rows.len(), languages = report.len(), "Computed completion stats");
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_distinguishes_null_from_absent_description() {
        let absent: UpdateTranslationKeyRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.description, None);

        let null: UpdateTranslationKeyRequest =
            serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(null.description, Some(None));

        let set: UpdateTranslationKeyRequest =
            serde_json::from_str(r#"{"description": "Shown on save"}"#).unwrap();
        assert_eq!(set.description, Some(Some("Shown on save".to_string())));
    }

    #[test]
    fn translation_input_timestamp_is_optional() {
        let input: TranslationInput =
            serde_json::from_str(r#"{"value": "Hola", "updated_by": "ana"}"#).unwrap();
        assert!(input.updated_at.is_none());
    }

    #[test]
    fn malformed_id_is_not_found() {
        assert!(matches!(parse_id("nope"), Err(ApiError::NotFound)));
    }
}
