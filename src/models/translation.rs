//! Translation model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Languages the site is translated into
pub const SUPPORTED_LANGUAGES: [&str; 3] = ["en", "id", "am"];

/// One translated UI string. `(key, language)` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub id: Uuid,
    /// Dotted message key, e.g. `hero.title`
    pub key: String,
    pub language: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

impl Translation {
    pub fn new(key: impl Into<String>, language: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            key: key.into(),
            language: language.into(),
            value: value.into(),
            updated_at: Utc::now(),
        }
    }
}

/// Check a language code against [`SUPPORTED_LANGUAGES`]
pub fn is_supported_language(language: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&language)
}
