//! Services layer - Business logic
//!
//! Services implement the business rules on top of the repositories and the
//! cache, and own input validation.

pub mod blog;
pub mod chatbot;
pub mod dashboard;
pub mod export_market;
pub mod inquiry;
pub mod lead;
pub mod password;
pub mod product;
pub mod rate_limiter;
pub mod token;
pub mod translation;
pub mod user;

pub use blog::{generate_slug, BlogService, BlogServiceError};
pub use chatbot::{ChatBackend, ChatbotReply, ChatbotService, OpenAiChatBackend};
pub use dashboard::{DashboardService, DashboardStats, PipelineCounts};
pub use export_market::{ExportMarketService, ExportMarketServiceError};
pub use inquiry::{InquiryService, InquiryServiceError, Submission};
pub use lead::{BoardColumn, DateRange, LeadFilter, LeadService, LeadServiceError};
pub use password::{hash_password, verify_password};
pub use product::{ProductService, ProductServiceError};
pub use rate_limiter::RateLimiter;
pub use token::{Claims, TokenError, TokenService};
pub use translation::{GroupedTranslations, TranslationMap, TranslationService, TranslationServiceError};
pub use user::{LoginInput, LoginResult, UserService, UserServiceError};
