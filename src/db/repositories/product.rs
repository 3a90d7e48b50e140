//! Product repository

use crate::models::Product;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: &Product) -> Result<Product>;
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Product>>;
    /// Every product, active or not
    async fn list(&self) -> Result<Vec<Product>>;
    async fn list_active(&self) -> Result<Vec<Product>>;
    async fn list_active_by_category(&self, category: &str) -> Result<Vec<Product>>;
    async fn update(&self, product: &Product) -> Result<Option<Product>>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

#[derive(Default)]
pub struct MemoryProductRepository {
    products: RwLock<HashMap<Uuid, Product>>,
}

impl MemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxed() -> Arc<dyn ProductRepository> {
        Arc::new(Self::new())
    }

    async fn collect(&self, keep: impl Fn(&Product) -> bool) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .products
            .read()
            .await
            .values()
            .filter(|p| keep(p))
            .cloned()
            .collect();
        // Catalog order: oldest first, then name
        products.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.name.cmp(&b.name)));
        products
    }
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn create(&self, product: &Product) -> Result<Product> {
        self.products.write().await.insert(product.id, product.clone());
        Ok(product.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>> {
        Ok(self.collect(|_| true).await)
    }

    async fn list_active(&self) -> Result<Vec<Product>> {
        Ok(self.collect(|p| p.is_active).await)
    }

    async fn list_active_by_category(&self, category: &str) -> Result<Vec<Product>> {
        Ok(self.collect(|p| p.is_active && p.category == category).await)
    }

    async fn update(&self, product: &Product) -> Result<Option<Product>> {
        let mut products = self.products.write().await;
        match products.get_mut(&product.id) {
            Some(existing) => {
                *existing = product.clone();
                Ok(Some(product.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.products.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateProductInput;

    fn product(name: &str, category: &str, active: bool) -> Product {
        Product::from_input(CreateProductInput {
            name: name.to_string(),
            category: category.to_string(),
            is_active: Some(active),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_active_filters() {
        let repo = MemoryProductRepository::new();
        repo.create(&product("Excl Power", "micronutrients", true)).await.unwrap();
        repo.create(&product("Old Mix", "micronutrients", false)).await.unwrap();
        repo.create(&product("Bactowin", "bactericide-fungicide", true)).await.unwrap();

        assert_eq!(repo.list().await.unwrap().len(), 3);
        assert_eq!(repo.list_active().await.unwrap().len(), 2);
        let micros = repo.list_active_by_category("micronutrients").await.unwrap();
        assert_eq!(micros.len(), 1);
        assert_eq!(micros[0].name, "Excl Power");
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = MemoryProductRepository::new();
        let p = repo.create(&product("K-Max", "pesticides", true)).await.unwrap();
        assert!(repo.delete(p.id).await.unwrap());
        assert!(!repo.delete(p.id).await.unwrap());
        assert!(repo.get_by_id(p.id).await.unwrap().is_none());
    }
}
