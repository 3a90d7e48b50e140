//! User repository

use crate::models::User;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User>;
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn list(&self) -> Result<Vec<User>>;
    async fn update(&self, user: &User) -> Result<Option<User>>;
    async fn count(&self) -> Result<usize>;
}

/// In-memory user store
#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxed() -> Arc<dyn UserRepository> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.username == user.username || u.email.eq_ignore_ascii_case(&user.email))
        {
            anyhow::bail!("User '{}' already exists", user.username);
        }
        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }

    async fn update(&self, user: &User) -> Result<Option<User>> {
        let mut users = self.users.write().await;
        match users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(Some(user.clone()))
            }
            None => Ok(None),
        }
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.users.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;

    fn user(username: &str, email: &str) -> User {
        User::new(
            username.to_string(),
            "hash".to_string(),
            UserRole::SalesTeam,
            email.to_string(),
            "Sales".to_string(),
        )
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let repo = MemoryUserRepository::new();
        let created = repo.create(&user("priya", "priya@example.com")).await.unwrap();

        assert_eq!(repo.get_by_id(created.id).await.unwrap().unwrap().username, "priya");
        assert!(repo.get_by_username("priya").await.unwrap().is_some());
        assert!(repo.get_by_email("PRIYA@example.com").await.unwrap().is_some());
        assert!(repo.get_by_username("nobody").await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let repo = MemoryUserRepository::new();
        repo.create(&user("priya", "priya@example.com")).await.unwrap();
        assert!(repo.create(&user("priya", "other@example.com")).await.is_err());
        assert!(repo.create(&user("other", "priya@example.com")).await.is_err());
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let repo = MemoryUserRepository::new();
        assert!(repo.update(&user("ghost", "ghost@example.com")).await.unwrap().is_none());
    }
}
