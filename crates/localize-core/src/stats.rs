//! Translation completion statistics.
//!
//! Completion for a language is the share of all keys that carry a
//! populated value for that language code, expressed as a percentage.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::Translations;

/// Completion percentage per language code.
pub type CompletionStats = BTreeMap<String, f64>;

/// Computes completion percentages over every key's translations.
///
/// The language set is the union of codes present on any key, including
/// codes whose values are all empty (those report `0.0`). Returns an empty
/// map when there are no keys or no languages.
#[allow(clippy::cast_precision_loss)]
pub fn completion<'a, I>(rows: I) -> CompletionStats
where
    I: IntoIterator<Item = &'a Translations>,
{
    let rows: Vec<&Translations> = rows.into_iter().collect();
    let total = rows.len();

    let languages: BTreeSet<&str> =
        rows.iter().flat_map(|translations| translations.keys().map(String::as_str)).collect();

    if total == 0 || languages.is_empty() {
        return CompletionStats::new();
    }

    languages
        .into_iter()
        .map(|language| {
            let populated = rows
                .iter()
                .filter(|translations| translations.get(language).is_some_and(|t| t.is_populated()))
                .count();
            (language.to_string(), populated as f64 / total as f64 * 100.0)
        })
        .collect()
}
