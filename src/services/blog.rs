//! Blog service
//!
//! Knowledge-base posts: the public published feed and slug lookup, plus
//! admin authoring with slug generation and conflict checks.

use crate::cache::{invalidate_prefix, CacheLayer, MemoryCache, BLOG_PREFIX};
use crate::db::repositories::BlogPostRepository;
use crate::models::{BlogPost, CreateBlogPostInput, UpdateBlogPostInput};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const CACHE_KEY_PUBLISHED: &str = "blog:published";
const CACHE_KEY_SLUG: &str = "blog:slug:";

#[derive(Debug, thiserror::Error)]
pub enum BlogServiceError {
    #[error("Blog post not found: {0}")]
    NotFound(String),

    #[error("Slug already exists: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub struct BlogService {
    repo: Arc<dyn BlogPostRepository>,
    cache: Arc<MemoryCache>,
    cache_ttl: Duration,
}

impl BlogService {
    pub fn new(repo: Arc<dyn BlogPostRepository>, cache: Arc<MemoryCache>) -> Self {
        let cache_ttl = cache.default_ttl();
        Self {
            repo,
            cache,
            cache_ttl,
        }
    }

    /// Published posts, most recently published first
    pub async fn list_published(&self) -> Result<Vec<BlogPost>, BlogServiceError> {
        if let Ok(Some(cached)) = self.cache.get::<Vec<BlogPost>>(CACHE_KEY_PUBLISHED).await {
            return Ok(cached);
        }

        let posts = self
            .repo
            .list_published()
            .await
            .context("Failed to list published posts")?;
        let _ = self.cache.set(CACHE_KEY_PUBLISHED, &posts, self.cache_ttl).await;
        Ok(posts)
    }

    /// Public lookup; drafts are reported as not found
    pub async fn get_published_by_slug(&self, slug: &str) -> Result<BlogPost, BlogServiceError> {
        let cache_key = format!("{}{}", CACHE_KEY_SLUG, slug);
        if let Ok(Some(cached)) = self.cache.get::<BlogPost>(&cache_key).await {
            return Ok(cached);
        }

        let post = self
            .repo
            .get_by_slug(slug)
            .await
            .context("Failed to get post by slug")?
            .filter(|p| p.is_published)
            .ok_or_else(|| BlogServiceError::NotFound(slug.to_string()))?;

        let _ = self.cache.set(&cache_key, &post, self.cache_ttl).await;
        Ok(post)
    }

    /// Every post including drafts, newest first
    pub async fn list_all(&self) -> Result<Vec<BlogPost>, BlogServiceError> {
        Ok(self.repo.list().await.context("Failed to list posts")?)
    }

    pub async fn get(&self, id: Uuid) -> Result<BlogPost, BlogServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get post")?
            .ok_or_else(|| BlogServiceError::NotFound(id.to_string()))
    }

    /// Create a post authored by `author_id`.
    ///
    /// A blank slug is generated from the title.
    pub async fn create(
        &self,
        input: CreateBlogPostInput,
        author_id: Option<Uuid>,
    ) -> Result<BlogPost, BlogServiceError> {
        if input.title.trim().is_empty() {
            return Err(BlogServiceError::ValidationError("Title is required".to_string()));
        }
        if input.content.trim().is_empty() {
            return Err(BlogServiceError::ValidationError("Content is required".to_string()));
        }

        let source = if input.slug.trim().is_empty() {
            &input.title
        } else {
            &input.slug
        };
        let slug = generate_slug(source);
        if slug.is_empty() {
            return Err(BlogServiceError::ValidationError(
                "Slug cannot be empty".to_string(),
            ));
        }
        if self
            .repo
            .exists_by_slug(&slug)
            .await
            .context("Failed to check slug")?
        {
            return Err(BlogServiceError::Conflict(slug));
        }

        let post = self
            .repo
            .create(&BlogPost::from_input(input, slug, author_id))
            .await
            .context("Failed to create post")?;

        invalidate_prefix(&self.cache, BLOG_PREFIX).await;
        tracing::info!("Created blog post {}", post.slug);
        Ok(post)
    }

    pub async fn update(&self, id: Uuid, mut input: UpdateBlogPostInput) -> Result<BlogPost, BlogServiceError> {
        if matches!(input.title.as_deref(), Some(t) if t.trim().is_empty()) {
            return Err(BlogServiceError::ValidationError("Title cannot be empty".to_string()));
        }

        let mut post = self.get(id).await?;

        if let Some(raw) = input.slug.take() {
            let slug = generate_slug(&raw);
            if slug.is_empty() {
                return Err(BlogServiceError::ValidationError(
                    "Slug cannot be empty".to_string(),
                ));
            }
            if slug != post.slug {
                let taken = self
                    .repo
                    .get_by_slug(&slug)
                    .await
                    .context("Failed to check slug")?
                    .is_some_and(|other| other.id != id);
                if taken {
                    return Err(BlogServiceError::Conflict(slug));
                }
            }
            input.slug = Some(slug);
        }

        post.apply(input);
        let updated = self
            .repo
            .update(&post)
            .await
            .context("Failed to update post")?
            .ok_or_else(|| BlogServiceError::NotFound(id.to_string()))?;

        invalidate_prefix(&self.cache, BLOG_PREFIX).await;
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), BlogServiceError> {
        if !self.repo.delete(id).await.context("Failed to delete post")? {
            return Err(BlogServiceError::NotFound(id.to_string()));
        }

        invalidate_prefix(&self.cache, BLOG_PREFIX).await;
        tracing::info!("Deleted blog post {}", id);
        Ok(())
    }
}

/// Generate a URL-safe slug from a title.
///
/// ASCII letters and digits are lowercased and kept, non-ASCII letters are
/// kept as is, everything else becomes a single hyphen.
pub fn generate_slug(title: &str) -> String {
    let slug: String = title
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || !c.is_ascii() {
                c
            } else {
                '-'
            }
        })
        .collect();

    let mut result = String::with_capacity(slug.len());
    let mut prev_hyphen = false;
    for c in slug.chars() {
        if c == '-' {
            if !prev_hyphen && !result.is_empty() {
                result.push(c);
                prev_hyphen = true;
            }
        } else {
            result.push(c);
            prev_hyphen = false;
        }
    }

    result.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::MemoryBlogPostRepository;

    fn setup_service() -> BlogService {
        BlogService::new(MemoryBlogPostRepository::boxed(), Arc::new(MemoryCache::new()))
    }

    fn draft(title: &str) -> CreateBlogPostInput {
        CreateBlogPostInput {
            title: title.to_string(),
            content: "Body".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_slug() {
        assert_eq!(
            generate_slug("Zinc Deficiency: Symptoms and Solutions"),
            "zinc-deficiency-symptoms-and-solutions"
        );
        assert_eq!(generate_slug("  Foliar   feeding__101 "), "foliar-feeding-101");
        assert_eq!(generate_slug("40% Yield Increase!"), "40-yield-increase");
        assert_eq!(generate_slug("ማዳበሪያ guide"), "ማዳበሪያ-guide");
        assert_eq!(generate_slug("!!!"), "");
    }

    #[tokio::test]
    async fn test_create_generates_slug_from_title() {
        let service = setup_service();
        let post = service.create(draft("Cotton Farming Basics"), None).await.unwrap();
        assert_eq!(post.slug, "cotton-farming-basics");
        assert!(!post.is_published);
        assert!(post.published_at.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let service = setup_service();
        service.create(draft("Cotton Farming"), None).await.unwrap();
        assert!(matches!(
            service.create(draft("cotton farming"), None).await,
            Err(BlogServiceError::Conflict(_))
        ));

        let other = service.create(draft("Rice Farming"), None).await.unwrap();
        let result = service
            .update(
                other.id,
                UpdateBlogPostInput {
                    slug: Some("Cotton Farming".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(BlogServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_drafts_hidden_publicly() {
        let service = setup_service();
        let post = service.create(draft("Bio-fertilizers"), None).await.unwrap();

        assert!(service.list_published().await.unwrap().is_empty());
        assert!(matches!(
            service.get_published_by_slug(&post.slug).await,
            Err(BlogServiceError::NotFound(_))
        ));

        let published = service
            .update(
                post.id,
                UpdateBlogPostInput {
                    is_published: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(published.published_at.is_some());

        assert_eq!(service.list_published().await.unwrap().len(), 1);
        assert_eq!(
            service.get_published_by_slug(&post.slug).await.unwrap().id,
            post.id
        );
    }

    #[tokio::test]
    async fn test_create_records_author() {
        let service = setup_service();
        let author = Uuid::new_v4();
        let post = service
            .create(
                CreateBlogPostInput {
                    is_published: Some(true),
                    ..draft("Foliar Feeding")
                },
                Some(author),
            )
            .await
            .unwrap();
        assert_eq!(post.author_id, Some(author));
        assert!(post.published_at.is_some());
    }

    #[tokio::test]
    async fn test_delete() {
        let service = setup_service();
        let post = service.create(draft("Old news"), None).await.unwrap();
        service.delete(post.id).await.unwrap();
        assert!(matches!(
            service.delete(post.id).await,
            Err(BlogServiceError::NotFound(_))
        ));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Slugs never start or end with a hyphen and never contain "--"
            #[test]
            fn slug_shape(title in "\\PC{0,40}") {
                let slug = generate_slug(&title);
                prop_assert!(!slug.starts_with('-'));
                prop_assert!(!slug.ends_with('-'));
                prop_assert!(!slug.contains("--"));
                prop_assert!(!slug.chars().any(|c| c.is_ascii_uppercase() || c == ' '));
            }

            /// Generating a slug from a slug leaves it unchanged
            #[test]
            fn slug_idempotent(title in "[a-zA-Z0-9 _!?-]{0,40}") {
                let once = generate_slug(&title);
                prop_assert_eq!(generate_slug(&once), once.clone());
            }
        }
    }
}
