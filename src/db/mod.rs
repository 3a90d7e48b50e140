//! Storage layer
//!
//! This module provides the in-memory store for agrisite:
//! - Repository traits and their in-memory implementations
//! - Default data seeding

pub mod repositories;
pub mod seed;

use std::sync::Arc;

use repositories::{
    BlogPostRepository, ExportMarketRepository, InquiryRepository, LeadRepository,
    MemoryBlogPostRepository, MemoryExportMarketRepository, MemoryInquiryRepository,
    MemoryLeadRepository, MemoryProductRepository, MemoryTranslationRepository,
    MemoryUserRepository, ProductRepository, TranslationRepository, UserRepository,
};

/// All repositories, shared by the services
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub leads: Arc<dyn LeadRepository>,
    pub blog_posts: Arc<dyn BlogPostRepository>,
    pub translations: Arc<dyn TranslationRepository>,
    pub inquiries: Arc<dyn InquiryRepository>,
    pub export_markets: Arc<dyn ExportMarketRepository>,
}

impl Store {
    /// Create an empty in-memory store
    pub fn in_memory() -> Self {
        Self {
            users: MemoryUserRepository::boxed(),
            products: MemoryProductRepository::boxed(),
            leads: MemoryLeadRepository::boxed(),
            blog_posts: MemoryBlogPostRepository::boxed(),
            translations: MemoryTranslationRepository::boxed(),
            inquiries: MemoryInquiryRepository::boxed(),
            export_markets: MemoryExportMarketRepository::boxed(),
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::in_memory()
    }
}
