//! HTTP request handlers for the localization API.
//!
//! Handlers follow one pattern: validate input, make the store call, map
//! failures through [`ApiError`](crate::error::ApiError).
//!
//! - `translation_keys` - CRUD, bulk update and completion statistics
//! - `health` - Health, readiness and liveness probes

pub mod health;
pub mod translation_keys;

pub use health::{health_check, liveness_check, readiness_check};
pub use translation_keys::{
    bulk_update_translations, completion_stats, create_translation_key, delete_translation_key,
    get_translation_key, list_translation_keys, reserved_path, update_translation_key,
};
