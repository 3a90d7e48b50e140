//! Export market service

use crate::cache::{invalidate_prefix, CacheLayer, MemoryCache, MARKETS_PREFIX};
use crate::db::repositories::ExportMarketRepository;
use crate::models::{CreateExportMarketInput, ExportMarket, UpdateExportMarketInput};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const CACHE_KEY_ACTIVE: &str = "markets:active";

#[derive(Debug, thiserror::Error)]
pub enum ExportMarketServiceError {
    #[error("Export market not found: {0}")]
    NotFound(Uuid),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub struct ExportMarketService {
    repo: Arc<dyn ExportMarketRepository>,
    cache: Arc<MemoryCache>,
    cache_ttl: Duration,
}

impl ExportMarketService {
    pub fn new(repo: Arc<dyn ExportMarketRepository>, cache: Arc<MemoryCache>) -> Self {
        let cache_ttl = cache.default_ttl();
        Self {
            repo,
            cache,
            cache_ttl,
        }
    }

    /// Active markets sorted by country
    pub async fn list_active(&self) -> Result<Vec<ExportMarket>, ExportMarketServiceError> {
        if let Ok(Some(cached)) = self.cache.get::<Vec<ExportMarket>>(CACHE_KEY_ACTIVE).await {
            return Ok(cached);
        }

        let markets = self
            .repo
            .list_active()
            .await
            .context("Failed to list export markets")?;
        let _ = self.cache.set(CACHE_KEY_ACTIVE, &markets, self.cache_ttl).await;
        Ok(markets)
    }

    pub async fn list_all(&self) -> Result<Vec<ExportMarket>, ExportMarketServiceError> {
        Ok(self.repo.list().await.context("Failed to list export markets")?)
    }

    pub async fn create(&self, input: CreateExportMarketInput) -> Result<ExportMarket, ExportMarketServiceError> {
        if input.country.trim().is_empty() {
            return Err(ExportMarketServiceError::ValidationError(
                "Country is required".to_string(),
            ));
        }
        Self::validate_code(&input.country_code)?;
        if input.product_count.is_some_and(|c| c < 0) {
            return Err(ExportMarketServiceError::ValidationError(
                "Product count cannot be negative".to_string(),
            ));
        }

        let market = self
            .repo
            .create(&ExportMarket::from_input(input))
            .await
            .context("Failed to create export market")?;

        invalidate_prefix(&self.cache, MARKETS_PREFIX).await;
        tracing::info!("Added export market {}", market.country);
        Ok(market)
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateExportMarketInput,
    ) -> Result<ExportMarket, ExportMarketServiceError> {
        if let Some(code) = input.country_code.as_deref() {
            Self::validate_code(code)?;
        }
        if input.product_count.is_some_and(|c| c < 0) {
            return Err(ExportMarketServiceError::ValidationError(
                "Product count cannot be negative".to_string(),
            ));
        }

        let mut market = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get export market")?
            .ok_or(ExportMarketServiceError::NotFound(id))?;
        market.apply(input);

        let updated = self
            .repo
            .update(&market)
            .await
            .context("Failed to update export market")?
            .ok_or(ExportMarketServiceError::NotFound(id))?;

        invalidate_prefix(&self.cache, MARKETS_PREFIX).await;
        Ok(updated)
    }

    /// ISO 3166-1 alpha-2 shape: two ASCII letters
    fn validate_code(code: &str) -> Result<(), ExportMarketServiceError> {
        let code = code.trim();
        if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(())
        } else {
            Err(ExportMarketServiceError::ValidationError(format!(
                "Invalid country code: '{}'",
                code
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::MemoryExportMarketRepository;

    fn setup_service() -> ExportMarketService {
        ExportMarketService::new(
            MemoryExportMarketRepository::boxed(),
            Arc::new(MemoryCache::new()),
        )
    }

    fn market(country: &str, code: &str) -> CreateExportMarketInput {
        CreateExportMarketInput {
            country: country.to_string(),
            country_code: code.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_validates_code() {
        let service = setup_service();
        assert!(matches!(
            service.create(market("Kenya", "KEN")).await,
            Err(ExportMarketServiceError::ValidationError(_))
        ));
        let created = service.create(market("Kenya", "ke")).await.unwrap();
        assert_eq!(created.country_code, "KE");
        assert!(created.is_active);
    }

    #[tokio::test]
    async fn test_deactivate_hides_from_public_list() {
        let service = setup_service();
        let kenya = service.create(market("Kenya", "KE")).await.unwrap();
        service.create(market("Vietnam", "VN")).await.unwrap();
        assert_eq!(service.list_active().await.unwrap().len(), 2);

        service
            .update(
                kenya.id,
                UpdateExportMarketInput {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let active = service.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].country, "Vietnam");
        assert_eq!(service.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_missing() {
        let service = setup_service();
        assert!(matches!(
            service.update(Uuid::new_v4(), UpdateExportMarketInput::default()).await,
            Err(ExportMarketServiceError::NotFound(_))
        ));
    }
}
