//! Lead repository

use crate::models::{Lead, LeadStatus};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[async_trait]
pub trait LeadRepository: Send + Sync {
    async fn create(&self, lead: &Lead) -> Result<Lead>;
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Lead>>;
    /// All leads, newest first
    async fn list(&self) -> Result<Vec<Lead>>;
    async fn list_by_status(&self, status: LeadStatus) -> Result<Vec<Lead>>;
    async fn list_by_assignee(&self, user_id: Uuid) -> Result<Vec<Lead>>;
    async fn update(&self, lead: &Lead) -> Result<Option<Lead>>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

#[derive(Default)]
pub struct MemoryLeadRepository {
    leads: RwLock<HashMap<Uuid, Lead>>,
}

impl MemoryLeadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxed() -> Arc<dyn LeadRepository> {
        Arc::new(Self::new())
    }

    async fn newest_first(&self, keep: impl Fn(&Lead) -> bool) -> Vec<Lead> {
        let mut leads: Vec<Lead> = self
            .leads
            .read()
            .await
            .values()
            .filter(|l| keep(l))
            .cloned()
            .collect();
        leads.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        leads
    }
}

#[async_trait]
impl LeadRepository for MemoryLeadRepository {
    async fn create(&self, lead: &Lead) -> Result<Lead> {
        self.leads.write().await.insert(lead.id, lead.clone());
        Ok(lead.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Lead>> {
        Ok(self.leads.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Lead>> {
        Ok(self.newest_first(|_| true).await)
    }

    async fn list_by_status(&self, status: LeadStatus) -> Result<Vec<Lead>> {
        Ok(self.newest_first(|l| l.status == status).await)
    }

    async fn list_by_assignee(&self, user_id: Uuid) -> Result<Vec<Lead>> {
        Ok(self.newest_first(|l| l.assigned_to == Some(user_id)).await)
    }

    async fn update(&self, lead: &Lead) -> Result<Option<Lead>> {
        let mut leads = self.leads.write().await;
        match leads.get_mut(&lead.id) {
            Some(existing) => {
                *existing = lead.clone();
                Ok(Some(lead.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.leads.write().await.remove(&id).is_some())
    }
}
