//! Blog post repository

use crate::models::BlogPost;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[async_trait]
pub trait BlogPostRepository: Send + Sync {
    async fn create(&self, post: &BlogPost) -> Result<BlogPost>;
    async fn get_by_id(&self, id: Uuid) -> Result<Option<BlogPost>>;
    async fn get_by_slug(&self, slug: &str) -> Result<Option<BlogPost>>;
    /// All posts, newest created first
    async fn list(&self) -> Result<Vec<BlogPost>>;
    /// Published posts, most recently published first
    async fn list_published(&self) -> Result<Vec<BlogPost>>;
    async fn update(&self, post: &BlogPost) -> Result<Option<BlogPost>>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;
}

#[derive(Default)]
pub struct MemoryBlogPostRepository {
    posts: RwLock<HashMap<Uuid, BlogPost>>,
}

impl MemoryBlogPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxed() -> Arc<dyn BlogPostRepository> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl BlogPostRepository for MemoryBlogPostRepository {
    async fn create(&self, post: &BlogPost) -> Result<BlogPost> {
        let mut posts = self.posts.write().await;
        if posts.values().any(|p| p.slug == post.slug) {
            anyhow::bail!("Blog post with slug '{}' already exists", post.slug);
        }
        posts.insert(post.id, post.clone());
        Ok(post.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<BlogPost>> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<BlogPost>> {
        Ok(self.posts.read().await.values().find(|p| p.slug == slug).cloned())
    }

    async fn list(&self) -> Result<Vec<BlogPost>> {
        let mut posts: Vec<BlogPost> = self.posts.read().await.values().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn list_published(&self) -> Result<Vec<BlogPost>> {
        let mut posts: Vec<BlogPost> = self
            .posts
            .read()
            .await
            .values()
            .filter(|p| p.is_published)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(posts)
    }

    async fn update(&self, post: &BlogPost) -> Result<Option<BlogPost>> {
        let mut posts = self.posts.write().await;
        if posts.values().any(|p| p.slug == post.slug && p.id != post.id) {
            anyhow::bail!("Blog post with slug '{}' already exists", post.slug);
        }
        match posts.get_mut(&post.id) {
            Some(existing) => {
                *existing = post.clone();
                Ok(Some(post.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.posts.write().await.remove(&id).is_some())
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        Ok(self.posts.read().await.values().any(|p| p.slug == slug))
    }
}
