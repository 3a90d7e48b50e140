//! Blog post model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::double_option;

/// A knowledge-base article (research note, case study or guide).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: Uuid,
    pub title: String,
    /// URL slug (unique)
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub category: BlogCategory,
    pub image_url: Option<String>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: Option<Uuid>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlogPost {
    /// Build a post from input; `slug` has already been resolved by the caller
    pub fn from_input(input: CreateBlogPostInput, slug: String, author_id: Option<Uuid>) -> Self {
        let now = Utc::now();
        let is_published = input.is_published.unwrap_or(false);
        let published_at = match (is_published, input.published_at) {
            (_, Some(at)) => Some(at),
            (true, None) => Some(now),
            (false, None) => None,
        };
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            slug,
            content: input.content,
            excerpt: input.excerpt,
            category: input.category,
            image_url: input.image_url,
            is_published,
            published_at,
            author_id,
            meta_title: input.meta_title,
            meta_description: input.meta_description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge a partial update and stamp `updated_at`
    pub fn apply(&mut self, update: UpdateBlogPostInput) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(slug) = update.slug {
            self.slug = slug;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(excerpt) = update.excerpt {
            self.excerpt = excerpt;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(image_url) = update.image_url {
            self.image_url = image_url;
        }
        if let Some(published_at) = update.published_at {
            self.published_at = published_at;
        }
        if let Some(is_published) = update.is_published {
            self.is_published = is_published;
            if is_published && self.published_at.is_none() {
                self.published_at = Some(Utc::now());
            }
        }
        if let Some(meta_title) = update.meta_title {
            self.meta_title = meta_title;
        }
        if let Some(meta_description) = update.meta_description {
            self.meta_description = meta_description;
        }
        self.updated_at = Utc::now();
    }
}

/// Blog post category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BlogCategory {
    Research,
    CaseStudy,
    #[default]
    Guide,
}

impl fmt::Display for BlogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlogCategory::Research => write!(f, "research"),
            BlogCategory::CaseStudy => write!(f, "case-study"),
            BlogCategory::Guide => write!(f, "guide"),
        }
    }
}

impl FromStr for BlogCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "research" => Ok(BlogCategory::Research),
            "case-study" => Ok(BlogCategory::CaseStudy),
            "guide" => Ok(BlogCategory::Guide),
            _ => Err(anyhow::anyhow!("Invalid blog category: {}", s)),
        }
    }
}

/// Input for creating a blog post
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlogPostInput {
    pub title: String,
    /// Generated from the title when blank
    #[serde(default)]
    pub slug: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub category: BlogCategory,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_published: Option<bool>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub meta_title: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
}

/// Partial blog post update
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlogPostInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub excerpt: Option<Option<String>>,
    pub category: Option<BlogCategory>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
    pub is_published: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub published_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub meta_title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub meta_description: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(published: bool) -> CreateBlogPostInput {
        CreateBlogPostInput {
            title: "Zinc Deficiency: Symptoms and Solutions".to_string(),
            content: "Understanding zinc deficiency".to_string(),
            category: BlogCategory::Research,
            is_published: Some(published),
            ..Default::default()
        }
    }

    #[test]
    fn test_publishing_stamps_published_at() {
        let post = BlogPost::from_input(input(true), "zinc".to_string(), None);
        assert!(post.is_published);
        assert!(post.published_at.is_some());
    }

    #[test]
    fn test_draft_has_no_published_at() {
        let post = BlogPost::from_input(input(false), "zinc".to_string(), None);
        assert!(!post.is_published);
        assert!(post.published_at.is_none());
    }

    #[test]
    fn test_publish_later_through_update() {
        let mut post = BlogPost::from_input(input(false), "zinc".to_string(), None);
        post.apply(UpdateBlogPostInput {
            is_published: Some(true),
            ..Default::default()
        });
        assert!(post.published_at.is_some());
    }

    #[test]
    fn test_category_kebab_case() {
        assert_eq!(serde_json::to_string(&BlogCategory::CaseStudy).unwrap(), "\"case-study\"");
        assert_eq!("case-study".parse::<BlogCategory>().unwrap(), BlogCategory::CaseStudy);
    }
}
