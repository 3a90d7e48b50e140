//! Product service
//!
//! Public catalog reads (cached) and admin catalog management.

use crate::cache::{invalidate_prefix, CacheLayer, MemoryCache, CATALOG_PREFIX};
use crate::db::repositories::ProductRepository;
use crate::models::{CreateProductInput, Product, UpdateProductInput};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const CACHE_KEY_ACTIVE: &str = "catalog:active";
const CACHE_KEY_CATEGORY: &str = "catalog:category:";

#[derive(Debug, thiserror::Error)]
pub enum ProductServiceError {
    #[error("Product not found: {0}")]
    NotFound(Uuid),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub struct ProductService {
    repo: Arc<dyn ProductRepository>,
    cache: Arc<MemoryCache>,
    cache_ttl: Duration,
}

impl ProductService {
    pub fn new(repo: Arc<dyn ProductRepository>, cache: Arc<MemoryCache>) -> Self {
        let cache_ttl = cache.default_ttl();
        Self {
            repo,
            cache,
            cache_ttl,
        }
    }

    /// Active products, optionally restricted to one category
    pub async fn list_public(&self, category: Option<&str>) -> Result<Vec<Product>, ProductServiceError> {
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        let cache_key = match category {
            Some(c) => format!("{}{}", CACHE_KEY_CATEGORY, c),
            None => CACHE_KEY_ACTIVE.to_string(),
        };

        if let Ok(Some(cached)) = self.cache.get::<Vec<Product>>(&cache_key).await {
            return Ok(cached);
        }

        let products = match category {
            Some(c) => self.repo.list_active_by_category(c).await,
            None => self.repo.list_active().await,
        }
        .context("Failed to list products")?;

        let _ = self.cache.set(&cache_key, &products, self.cache_ttl).await;
        Ok(products)
    }

    /// Public product page; inactive products are not found
    pub async fn get_public(&self, id: Uuid) -> Result<Product, ProductServiceError> {
        match self.get(id).await? {
            product if product.is_active => Ok(product),
            _ => Err(ProductServiceError::NotFound(id)),
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<Product, ProductServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get product")?
            .ok_or(ProductServiceError::NotFound(id))
    }

    /// Every product including inactive ones
    pub async fn list_all(&self) -> Result<Vec<Product>, ProductServiceError> {
        Ok(self.repo.list().await.context("Failed to list products")?)
    }

    pub async fn create(&self, input: CreateProductInput) -> Result<Product, ProductServiceError> {
        if input.name.trim().is_empty() {
            return Err(ProductServiceError::ValidationError(
                "Product name is required".to_string(),
            ));
        }
        if input.category.trim().is_empty() {
            return Err(ProductServiceError::ValidationError(
                "Product category is required".to_string(),
            ));
        }

        let product = self
            .repo
            .create(&Product::from_input(input))
            .await
            .context("Failed to create product")?;

        invalidate_prefix(&self.cache, CATALOG_PREFIX).await;
        tracing::info!("Created product {} ({})", product.name, product.id);
        Ok(product)
    }

    pub async fn update(&self, id: Uuid, input: UpdateProductInput) -> Result<Product, ProductServiceError> {
        if matches!(input.name.as_deref(), Some(n) if n.trim().is_empty()) {
            return Err(ProductServiceError::ValidationError(
                "Product name cannot be empty".to_string(),
            ));
        }
        if matches!(input.category.as_deref(), Some(c) if c.trim().is_empty()) {
            return Err(ProductServiceError::ValidationError(
                "Product category cannot be empty".to_string(),
            ));
        }

        let mut product = self.get(id).await?;
        product.apply(input);

        let updated = self
            .repo
            .update(&product)
            .await
            .context("Failed to update product")?
            .ok_or(ProductServiceError::NotFound(id))?;

        invalidate_prefix(&self.cache, CATALOG_PREFIX).await;
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ProductServiceError> {
        let deleted = self.repo.delete(id).await.context("Failed to delete product")?;
        if !deleted {
            return Err(ProductServiceError::NotFound(id));
        }

        invalidate_prefix(&self.cache, CATALOG_PREFIX).await;
        tracing::info!("Deleted product {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::MemoryProductRepository;

    fn setup_service() -> ProductService {
        ProductService::new(MemoryProductRepository::boxed(), Arc::new(MemoryCache::new()))
    }

    fn input(name: &str, category: &str) -> CreateProductInput {
        CreateProductInput {
            name: name.to_string(),
            category: category.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_requires_name_and_category() {
        let service = setup_service();
        assert!(matches!(
            service.create(input("  ", "micronutrients")).await,
            Err(ProductServiceError::ValidationError(_))
        ));
        assert!(matches!(
            service.create(input("K-Max", "")).await,
            Err(ProductServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_category_filter() {
        let service = setup_service();
        service.create(input("Micro Mac", "micronutrients")).await.unwrap();
        service.create(input("Excl Power", "micronutrients")).await.unwrap();
        service.create(input("K-Max", "pesticides")).await.unwrap();

        assert_eq!(service.list_public(None).await.unwrap().len(), 3);
        assert_eq!(service.list_public(Some("micronutrients")).await.unwrap().len(), 2);
        assert_eq!(service.list_public(Some("unknown")).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_write_invalidates_public_list() {
        let service = setup_service();
        service.create(input("Micro Mac", "micronutrients")).await.unwrap();
        assert_eq!(service.list_public(None).await.unwrap().len(), 1);

        service.create(input("Cyto Max", "plant-growth-promotor")).await.unwrap();
        assert_eq!(service.list_public(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_deactivated_product_hidden_publicly() {
        let service = setup_service();
        let product = service.create(input("Humic Power", "liquid-fertilizer")).await.unwrap();

        service
            .update(
                product.id,
                UpdateProductInput {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            service.get_public(product.id).await,
            Err(ProductServiceError::NotFound(_))
        ));
        assert!(service.list_public(None).await.unwrap().is_empty());
        assert_eq!(service.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let service = setup_service();
        let product = service.create(input("K-Max", "pesticides")).await.unwrap();

        service.delete(product.id).await.unwrap();
        assert!(matches!(
            service.delete(product.id).await,
            Err(ProductServiceError::NotFound(_))
        ));
    }
}
