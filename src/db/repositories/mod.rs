//! Storage repositories
//!
//! Repository traits with in-memory implementations.
//! Each repository handles the operations for a single entity.

pub mod blog_post;
pub mod export_market;
pub mod inquiry;
pub mod lead;
pub mod product;
pub mod translation;
pub mod user;

pub use blog_post::{BlogPostRepository, MemoryBlogPostRepository};
pub use export_market::{ExportMarketRepository, MemoryExportMarketRepository};
pub use inquiry::{InquiryRepository, MemoryInquiryRepository};
pub use lead::{LeadRepository, MemoryLeadRepository};
pub use product::{MemoryProductRepository, ProductRepository};
pub use translation::{MemoryTranslationRepository, TranslationRepository};
pub use user::{MemoryUserRepository, UserRepository};
