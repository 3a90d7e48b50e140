//! API layer - HTTP handlers and routing
//!
//! JSON endpoints under `/api`:
//! - Public catalog, blog, export markets, translations
//! - Inquiry submission and the chatbot
//! - Login and public registration
//! - Admin endpoints grouped by role
//! - Static SPA bundle for every other path, when configured

pub mod admin;
pub mod auth;
pub mod blog;
pub mod chatbot;
pub mod common;
pub mod export_markets;
pub mod health;
pub mod inquiries;
pub mod middleware;
pub mod products;
pub mod translations;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::cache::create_cache;
use crate::config::{Config, ServerConfig};
use crate::db::Store;
use crate::services::{
    BlogService, ChatbotService, DashboardService, ExportMarketService, InquiryService,
    LeadService, ProductService, RateLimiter, TokenService, TranslationService, UserService,
};

pub use middleware::{ApiError, AppState, AuthenticatedUser, RequestStats};

impl AppState {
    /// Wire every service over `store` using the cache, token and chatbot
    /// settings from `config`.
    pub fn new(store: Store, config: &Config) -> anyhow::Result<Self> {
        let cache = create_cache(&config.cache);
        let tokens = TokenService::new(
            &config.auth.jwt_secret,
            config.auth.token_ttl_hours.max(1) as u64,
        );

        Ok(Self {
            user_service: Arc::new(UserService::new(store.users.clone(), tokens)),
            product_service: Arc::new(ProductService::new(store.products.clone(), cache.clone())),
            lead_service: Arc::new(LeadService::new(store.leads.clone(), store.users.clone())),
            inquiry_service: Arc::new(InquiryService::new(
                store.inquiries.clone(),
                store.leads.clone(),
            )),
            blog_service: Arc::new(BlogService::new(store.blog_posts.clone(), cache.clone())),
            translation_service: Arc::new(TranslationService::new(
                store.translations.clone(),
                cache.clone(),
            )),
            export_market_service: Arc::new(ExportMarketService::new(
                store.export_markets.clone(),
                cache,
            )),
            dashboard_service: Arc::new(DashboardService::new(store)),
            chatbot_service: Arc::new(ChatbotService::from_config(&config.chatbot)?),
            rate_limiter: Arc::new(RateLimiter::new()),
            request_stats: Arc::new(RequestStats::new()),
        })
    }
}

/// Build the API router (mounted under `/api`)
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin + marketing manager
    let content_routes = Router::new()
        .nest("/admin", admin::content_router())
        .route_layer(axum_middleware::from_fn(middleware::require_content_staff))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Any staff role
    let sales_routes = Router::new()
        .nest("/admin", admin::sales_router())
        .route_layer(axum_middleware::from_fn(middleware::require_sales_staff))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Admin only
    let admin_routes = Router::new()
        .nest("/admin", admin::admin_router())
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Any authenticated user
    let protected_routes = Router::new()
        .nest("/auth", auth::protected_router())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .nest("/health", health::router())
        .nest("/auth", auth::public_router())
        .nest("/products", products::router())
        .nest("/blog-posts", blog::router())
        .nest("/export-markets", export_markets::router())
        .nest("/translations", translations::router())
        .nest("/inquiries", inquiries::router())
        .nest("/chatbot", chatbot::router())
        .merge(content_routes)
        .merge(sales_routes)
        .merge(admin_routes)
        .merge(protected_routes)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    match origin.parse::<HeaderValue>() {
        Ok(origin) if origin != "*" => cors.allow_origin(origin),
        Ok(_) => cors.allow_origin(Any),
        Err(_) => {
            tracing::warn!("Invalid CORS origin '{}', allowing any origin", origin);
            cors.allow_origin(Any)
        }
    }
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    let mut router = Router::new().nest("/api", build_api_router(state.clone()));

    // Built SPA bundle; unknown paths get index.html for client-side routing
    if let Some(dir) = &server.static_dir {
        let spa = ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")));
        router = router.fallback_service(spa);
    }

    router
        .layer(cors_layer(&server.cors_origin))
        .layer(TraceLayer::new_for_http())
        // Request stats middleware (outermost layer, runs for all requests)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::request_stats_middleware,
        ))
        .with_state(state)
}
