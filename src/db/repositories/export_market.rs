//! Export market repository

use crate::models::ExportMarket;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[async_trait]
pub trait ExportMarketRepository: Send + Sync {
    async fn create(&self, market: &ExportMarket) -> Result<ExportMarket>;
    async fn get_by_id(&self, id: Uuid) -> Result<Option<ExportMarket>>;
    async fn list(&self) -> Result<Vec<ExportMarket>>;
    async fn list_active(&self) -> Result<Vec<ExportMarket>>;
    async fn update(&self, market: &ExportMarket) -> Result<Option<ExportMarket>>;
}

#[derive(Default)]
pub struct MemoryExportMarketRepository {
    markets: RwLock<HashMap<Uuid, ExportMarket>>,
}

impl MemoryExportMarketRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxed() -> Arc<dyn ExportMarketRepository> {
        Arc::new(Self::new())
    }

    async fn sorted(&self, active_only: bool) -> Vec<ExportMarket> {
        let mut markets: Vec<ExportMarket> = self
            .markets
            .read()
            .await
            .values()
            .filter(|m| !active_only || m.is_active)
            .cloned()
            .collect();
        markets.sort_by(|a, b| a.country.cmp(&b.country));
        markets
    }
}

#[async_trait]
impl ExportMarketRepository for MemoryExportMarketRepository {
    async fn create(&self, market: &ExportMarket) -> Result<ExportMarket> {
        self.markets.write().await.insert(market.id, market.clone());
        Ok(market.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<ExportMarket>> {
        Ok(self.markets.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<ExportMarket>> {
        Ok(self.sorted(false).await)
    }

    async fn list_active(&self) -> Result<Vec<ExportMarket>> {
        Ok(self.sorted(true).await)
    }

    async fn update(&self, market: &ExportMarket) -> Result<Option<ExportMarket>> {
        let mut markets = self.markets.write().await;
        match markets.get_mut(&market.id) {
            Some(existing) => {
                *existing = market.clone();
                Ok(Some(market.clone()))
            }
            None => Ok(None),
        }
    }
}
