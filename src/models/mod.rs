//! Data models
//!
//! This module contains the data structures used throughout agrisite.
//! Models represent:
//! - Stored entities (User, Product, Lead, BlogPost, Translation, Inquiry, ExportMarket)
//! - Create/update inputs accepted by the API
//!
//! Everything crosses the wire in camelCase, which is what the SPA expects.

mod blog_post;
mod export_market;
mod inquiry;
mod lead;
mod product;
mod translation;
mod user;

pub use blog_post::{BlogCategory, BlogPost, CreateBlogPostInput, UpdateBlogPostInput};
pub use export_market::{CreateExportMarketInput, ExportMarket, UpdateExportMarketInput};
pub use inquiry::{data_field, Inquiry, InquiryType};
pub use lead::{CreateLeadInput, Lead, LeadSource, LeadStatus, UpdateLeadInput};
pub use product::{CreateProductInput, Product, UpdateProductInput};
pub use translation::{is_supported_language, Translation, SUPPORTED_LANGUAGES};
pub use user::{CreateUserInput, User, UserProfile, UserRole};

use serde::{Deserialize, Deserializer};

/// Deserialize a present field (including `null`) as `Some(..)`.
///
/// Paired with `#[serde(default)]` so an absent field stays `None`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
