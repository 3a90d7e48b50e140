//! Inquiry repository

use crate::models::Inquiry;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[async_trait]
pub trait InquiryRepository: Send + Sync {
    async fn create(&self, inquiry: &Inquiry) -> Result<Inquiry>;
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Inquiry>>;
    /// All inquiries, newest first
    async fn list(&self) -> Result<Vec<Inquiry>>;
    async fn set_processed(&self, id: Uuid, processed: bool) -> Result<Option<Inquiry>>;
    async fn count(&self) -> Result<usize>;
}

#[derive(Default)]
pub struct MemoryInquiryRepository {
    inquiries: RwLock<HashMap<Uuid, Inquiry>>,
}

impl MemoryInquiryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxed() -> Arc<dyn InquiryRepository> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl InquiryRepository for MemoryInquiryRepository {
    async fn create(&self, inquiry: &Inquiry) -> Result<Inquiry> {
        self.inquiries.write().await.insert(inquiry.id, inquiry.clone());
        Ok(inquiry.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Inquiry>> {
        Ok(self.inquiries.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Inquiry>> {
        let mut all: Vec<Inquiry> = self.inquiries.read().await.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn set_processed(&self, id: Uuid, processed: bool) -> Result<Option<Inquiry>> {
        let mut inquiries = self.inquiries.write().await;
        Ok(inquiries.get_mut(&id).map(|inquiry| {
            inquiry.processed = processed;
            inquiry.clone()
        }))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.inquiries.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InquiryType;

    #[tokio::test]
    async fn test_set_processed() {
        let repo = MemoryInquiryRepository::new();
        let inquiry = repo
            .create(&Inquiry::new(InquiryType::ContactForm, serde_json::Map::new(), None))
            .await
            .unwrap();

        let updated = repo.set_processed(inquiry.id, true).await.unwrap().unwrap();
        assert!(updated.processed);
        assert!(repo.set_processed(Uuid::new_v4(), true).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
