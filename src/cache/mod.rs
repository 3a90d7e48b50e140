//! Cache layer
//!
//! Public catalog reads (products, export markets, blog posts, translations)
//! are served from an in-process moka cache. Admin writes invalidate the
//! matching key pattern.
//!
//! # Usage
//!
//! ```rust,ignore
//! use agrisite::cache::{create_cache, CacheLayer};
//! use agrisite::config::CacheConfig;
//!
//! let cache = create_cache(&CacheConfig::default());
//! cache.set("catalog:all", &products, cache.default_ttl()).await?;
//! ```

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;

pub use memory::MemoryCache;

/// Key prefixes, one per cached resource family
pub const CATALOG_PREFIX: &str = "catalog:";
pub const MARKETS_PREFIX: &str = "markets:";
pub const BLOG_PREFIX: &str = "blog:";
pub const TRANSLATIONS_PREFIX: &str = "translations:";

/// Cache layer trait
///
/// The methods are generic over the stored type, so this trait is not object
/// safe. Services hold a concrete `Arc<MemoryCache>`.
#[async_trait]
pub trait CacheLayer: Send + Sync {
    /// Get a value from cache
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>>;

    /// Set a value in cache with TTL
    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: Duration) -> Result<()>;

    /// Delete a value from cache
    async fn delete(&self, key: &str) -> Result<()>;

    /// Delete all values matching a glob pattern
    async fn delete_pattern(&self, pattern: &str) -> Result<()>;

    /// Clear all cache entries
    async fn clear(&self) -> Result<()>;
}

/// Create the shared cache from configuration
pub fn create_cache(config: &CacheConfig) -> Arc<MemoryCache> {
    Arc::new(MemoryCache::with_capacity_and_ttl(
        config.max_capacity,
        Duration::from_secs(config.ttl_seconds),
    ))
}

/// Drop every entry under `prefix`. Failures are logged, not returned.
pub async fn invalidate_prefix(cache: &MemoryCache, prefix: &str) {
    let pattern = format!("{}*", prefix);
    if let Err(e) = cache.delete_pattern(&pattern).await {
        tracing::warn!("Failed to invalidate cache pattern {}: {}", pattern, e);
    }
}
