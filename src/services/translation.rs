//! Translation service
//!
//! UI string tables for English, Indonesian and Amharic.

use crate::cache::{invalidate_prefix, CacheLayer, MemoryCache, TRANSLATIONS_PREFIX};
use crate::db::repositories::TranslationRepository;
use crate::models::{is_supported_language, Translation, SUPPORTED_LANGUAGES};
use anyhow::Context;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// `{key: value}` for one language
pub type TranslationMap = BTreeMap<String, String>;

/// `{key: {language: value}}` across all languages
pub type GroupedTranslations = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, thiserror::Error)]
pub enum TranslationServiceError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub struct TranslationService {
    repo: Arc<dyn TranslationRepository>,
    cache: Arc<MemoryCache>,
    cache_ttl: Duration,
}

impl TranslationService {
    pub fn new(repo: Arc<dyn TranslationRepository>, cache: Arc<MemoryCache>) -> Self {
        let cache_ttl = cache.default_ttl();
        Self {
            repo,
            cache,
            cache_ttl,
        }
    }

    /// Strings for one language. Unknown languages yield an empty map.
    pub async fn map_for_language(&self, language: &str) -> Result<TranslationMap, TranslationServiceError> {
        if !is_supported_language(language) {
            return Ok(TranslationMap::new());
        }

        let cache_key = format!("{}{}", TRANSLATIONS_PREFIX, language);
        if let Ok(Some(cached)) = self.cache.get::<TranslationMap>(&cache_key).await {
            return Ok(cached);
        }

        let map: TranslationMap = self
            .repo
            .list_by_language(language)
            .await
            .context("Failed to list translations")?
            .into_iter()
            .map(|t| (t.key, t.value))
            .collect();

        let _ = self.cache.set(&cache_key, &map, self.cache_ttl).await;
        Ok(map)
    }

    /// Every key with its value in each language that has one
    pub async fn grouped(&self) -> Result<GroupedTranslations, TranslationServiceError> {
        let mut grouped = GroupedTranslations::new();
        for t in self.repo.list().await.context("Failed to list translations")? {
            grouped.entry(t.key).or_default().insert(t.language, t.value);
        }
        Ok(grouped)
    }

    /// Create or replace the value of `key` in `language`
    pub async fn update(
        &self,
        key: &str,
        language: &str,
        value: &str,
    ) -> Result<Translation, TranslationServiceError> {
        if key.trim().is_empty() {
            return Err(TranslationServiceError::ValidationError(
                "Key is required".to_string(),
            ));
        }
        if !is_supported_language(language) {
            return Err(TranslationServiceError::ValidationError(format!(
                "Unsupported language '{}', expected one of {}",
                language,
                SUPPORTED_LANGUAGES.join(", ")
            )));
        }
        if value.trim().is_empty() {
            return Err(TranslationServiceError::ValidationError(
                "Value is required".to_string(),
            ));
        }

        let translation = self
            .repo
            .upsert(key.trim(), language, value)
            .await
            .context("Failed to save translation")?;

        invalidate_prefix(&self.cache, TRANSLATIONS_PREFIX).await;
        Ok(translation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::MemoryTranslationRepository;

    fn setup_service() -> TranslationService {
        TranslationService::new(
            MemoryTranslationRepository::boxed(),
            Arc::new(MemoryCache::new()),
        )
    }

    #[tokio::test]
    async fn test_update_visible_in_language_map() {
        let service = setup_service();
        service.update("nav.home", "en", "Home").await.unwrap();
        assert_eq!(service.map_for_language("en").await.unwrap()["nav.home"], "Home");

        service.update("nav.home", "en", "Start").await.unwrap();
        assert_eq!(service.map_for_language("en").await.unwrap()["nav.home"], "Start");
    }

    #[tokio::test]
    async fn test_unknown_language_is_empty() {
        let service = setup_service();
        service.update("nav.home", "en", "Home").await.unwrap();
        assert!(service.map_for_language("fr").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_validation() {
        let service = setup_service();
        assert!(matches!(
            service.update("nav.home", "fr", "Accueil").await,
            Err(TranslationServiceError::ValidationError(_))
        ));
        assert!(matches!(
            service.update("nav.home", "en", "   ").await,
            Err(TranslationServiceError::ValidationError(_))
        ));
        assert!(matches!(
            service.update("", "en", "Home").await,
            Err(TranslationServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_grouped() {
        let service = setup_service();
        service.update("nav.home", "en", "Home").await.unwrap();
        service.update("nav.home", "id", "Beranda").await.unwrap();
        service.update("nav.home", "am", "ቤት").await.unwrap();
        service.update("nav.products", "en", "Products").await.unwrap();

        let grouped = service.grouped().await.unwrap();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["nav.home"].len(), 3);
        assert_eq!(grouped["nav.home"]["am"], "ቤት");
        assert_eq!(grouped["nav.products"].len(), 1);
    }
}
