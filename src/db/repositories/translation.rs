//! Translation repository

use crate::models::Translation;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[async_trait]
pub trait TranslationRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Translation>>;
    async fn list_by_language(&self, language: &str) -> Result<Vec<Translation>>;
    async fn get(&self, key: &str, language: &str) -> Result<Option<Translation>>;
    /// Insert or overwrite the `(key, language)` pair
    async fn upsert(&self, key: &str, language: &str, value: &str) -> Result<Translation>;
}

/// Translations keyed by `(key, language)`
#[derive(Default)]
pub struct MemoryTranslationRepository {
    translations: RwLock<HashMap<(String, String), Translation>>,
}

impl MemoryTranslationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxed() -> Arc<dyn TranslationRepository> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl TranslationRepository for MemoryTranslationRepository {
    async fn list(&self) -> Result<Vec<Translation>> {
        let mut all: Vec<Translation> = self.translations.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.key.cmp(&b.key).then_with(|| a.language.cmp(&b.language)));
        Ok(all)
    }

    async fn list_by_language(&self, language: &str) -> Result<Vec<Translation>> {
        let mut found: Vec<Translation> = self
            .translations
            .read()
            .await
            .values()
            .filter(|t| t.language == language)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(found)
    }

    async fn get(&self, key: &str, language: &str) -> Result<Option<Translation>> {
        Ok(self
            .translations
            .read()
            .await
            .get(&(key.to_string(), language.to_string()))
            .cloned())
    }

    async fn upsert(&self, key: &str, language: &str, value: &str) -> Result<Translation> {
        let mut translations = self.translations.write().await;
        let entry = translations
            .entry((key.to_string(), language.to_string()))
            .and_modify(|t| {
                t.value = value.to_string();
                t.updated_at = Utc::now();
            })
            .or_insert_with(|| Translation::new(key, language, value));
        Ok(entry.clone())
    }
}
