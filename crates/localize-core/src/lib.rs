//! Core domain models and storage for translation key management.
//!
//! Provides the translation key entity, the error taxonomy shared by the
//! storage and HTTP layers, completion statistics, and the
//! [`TranslationStore`](storage::TranslationStore) abstraction with its
//! PostgreSQL and in-memory implementations.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod models;
pub mod stats;
pub mod storage;
pub mod time;

pub use error::{CoreError, Result};
pub use models::{
    ListFilter, NewTranslationKey, Translation, TranslationKey, TranslationKeyId,
    TranslationKeyPatch, Translations,
};
pub use storage::{memory::MemoryStore, postgres::PgTranslationStore, TranslationStore};
pub use time::{Clock, RealClock, TestClock};
