//! Admin API endpoints
//!
//! Grouped by the roles allowed to call them:
//! - `content_router` (admin, marketing_manager): dashboard, products, blog
//!   posts, translations, export markets
//! - `sales_router` (every staff role): lead pipeline and inquiries; deleting
//!   a lead additionally requires admin
//! - `admin_router` (admin): staff accounts
//!
//! Role checks are applied as route layers in `api::build_api_router`.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, put},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::common::{ApiJson, ApiPath, ApiQuery, SuccessResponse};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{
    BlogPost, CreateBlogPostInput, CreateExportMarketInput, CreateLeadInput, CreateProductInput,
    CreateUserInput, ExportMarket, Inquiry, Lead, LeadStatus, Product, Translation,
    UpdateBlogPostInput, UpdateExportMarketInput, UpdateLeadInput, UpdateProductInput, UserProfile,
};
use crate::services::{BoardColumn, DashboardStats, GroupedTranslations, LeadFilter};

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub status: LeadStatus,
}

#[derive(Debug, Deserialize)]
pub struct ProcessedRequest {
    #[serde(default = "default_processed")]
    pub processed: bool,
}

fn default_processed() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct TranslationValueRequest {
    #[serde(default)]
    pub value: String,
}

// ============================================================================
// Routers
// ============================================================================

pub fn content_router() -> Router<AppState> {
    Router::new()
        .route("/dashboard/stats", get(dashboard_stats))
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", put(update_product).delete(delete_product))
        .route("/blog-posts", get(list_blog_posts).post(create_blog_post))
        .route(
            "/blog-posts/{id}",
            get(get_blog_post).put(update_blog_post).delete(delete_blog_post),
        )
        .route("/translations", get(list_translations))
        .route("/translations/{key}/{language}", put(update_translation))
        .route("/export-markets", get(list_export_markets).post(create_export_market))
        .route("/export-markets/{id}", put(update_export_market))
}

pub fn sales_router() -> Router<AppState> {
    Router::new()
        .route("/leads", get(list_leads).post(create_lead))
        .route("/leads/board", get(lead_board))
        .route("/leads/{id}", get(get_lead).put(update_lead).delete(delete_lead))
        .route("/leads/{id}/status", patch(move_lead))
        .route("/inquiries", get(list_inquiries))
        .route("/inquiries/{id}/processed", put(mark_inquiry_processed))
}

pub fn admin_router() -> Router<AppState> {
    Router::new().route("/users", get(list_users).post(create_user))
}

// ============================================================================
// Dashboard
// ============================================================================

/// GET /api/admin/dashboard/stats
async fn dashboard_stats(State(state): State<AppState>) -> Result<Json<DashboardStats>, ApiError> {
    let stats = state
        .dashboard_service
        .stats(Utc::now())
        .await
        .map_err(ApiError::internal)?;
    Ok(Json(stats))
}

// ============================================================================
// Products
// ============================================================================

/// GET /api/admin/products - includes inactive products
async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.product_service.list_all().await?))
}

async fn create_product(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateProductInput>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = state.product_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateProductInput>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.product_service.update(id, input).await?))
}

async fn delete_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.product_service.delete(id).await?;
    Ok(Json(SuccessResponse::ok()))
}

// ============================================================================
// Blog posts
// ============================================================================

/// GET /api/admin/blog-posts - drafts included
async fn list_blog_posts(State(state): State<AppState>) -> Result<Json<Vec<BlogPost>>, ApiError> {
    Ok(Json(state.blog_service.list_all().await?))
}

async fn get_blog_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<BlogPost>, ApiError> {
    Ok(Json(state.blog_service.get(id).await?))
}

/// POST /api/admin/blog-posts - the caller becomes the author
async fn create_blog_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(input): ApiJson<CreateBlogPostInput>,
) -> Result<(StatusCode, Json<BlogPost>), ApiError> {
    let post = state.blog_service.create(input, Some(user.0.id)).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn update_blog_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateBlogPostInput>,
) -> Result<Json<BlogPost>, ApiError> {
    Ok(Json(state.blog_service.update(id, input).await?))
}

async fn delete_blog_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.blog_service.delete(id).await?;
    Ok(Json(SuccessResponse::ok()))
}

// ============================================================================
// Translations
// ============================================================================

/// GET /api/admin/translations - `{key: {language: value}}`
async fn list_translations(
    State(state): State<AppState>,
) -> Result<Json<GroupedTranslations>, ApiError> {
    Ok(Json(state.translation_service.grouped().await?))
}

/// PUT /api/admin/translations/{key}/{language} - create or replace
async fn update_translation(
    State(state): State<AppState>,
    ApiPath((key, language)): ApiPath<(String, String)>,
    ApiJson(body): ApiJson<TranslationValueRequest>,
) -> Result<Json<Translation>, ApiError> {
    let translation = state
        .translation_service
        .update(&key, &language, &body.value)
        .await?;
    Ok(Json(translation))
}

// ============================================================================
// Export markets
// ============================================================================

async fn list_export_markets(
    State(state): State<AppState>,
) -> Result<Json<Vec<ExportMarket>>, ApiError> {
    Ok(Json(state.export_market_service.list_all().await?))
}

async fn create_export_market(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateExportMarketInput>,
) -> Result<(StatusCode, Json<ExportMarket>), ApiError> {
    let market = state.export_market_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(market)))
}

async fn update_export_market(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateExportMarketInput>,
) -> Result<Json<ExportMarket>, ApiError> {
    Ok(Json(state.export_market_service.update(id, input).await?))
}

// ============================================================================
// Leads
// ============================================================================

/// GET /api/admin/leads?status=&source=&country=&assignedTo=&search=
async fn list_leads(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<LeadFilter>,
) -> Result<Json<Vec<Lead>>, ApiError> {
    Ok(Json(state.lead_service.list(&filter).await?))
}

/// GET /api/admin/leads/board - six columns in pipeline order
async fn lead_board(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<LeadFilter>,
) -> Result<Json<Vec<BoardColumn>>, ApiError> {
    Ok(Json(state.lead_service.board(&filter).await?))
}

/// POST /api/admin/leads - manual entry (phone, trade fair, WhatsApp)
async fn create_lead(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateLeadInput>,
) -> Result<(StatusCode, Json<Lead>), ApiError> {
    let lead = state.lead_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

async fn get_lead(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Lead>, ApiError> {
    Ok(Json(state.lead_service.get(id).await?))
}

async fn update_lead(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateLeadInput>,
) -> Result<Json<Lead>, ApiError> {
    Ok(Json(state.lead_service.update(id, input).await?))
}

/// PATCH /api/admin/leads/{id}/status - Kanban drop
async fn move_lead(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<StatusChangeRequest>,
) -> Result<Json<Lead>, ApiError> {
    let lead = state.lead_service.move_to_stage(id, body.status).await?;
    tracing::info!("{} moved lead {} to {}", user.0.username, id, body.status);
    Ok(Json(lead))
}

/// DELETE /api/admin/leads/{id} - admin only
async fn delete_lead(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if !user.0.is_admin() {
        return Err(ApiError::forbidden("Insufficient permissions"));
    }
    state.lead_service.delete(id).await?;
    Ok(Json(SuccessResponse::ok()))
}

// ============================================================================
// Inquiries
// ============================================================================

async fn list_inquiries(State(state): State<AppState>) -> Result<Json<Vec<Inquiry>>, ApiError> {
    Ok(Json(state.inquiry_service.list().await?))
}

async fn mark_inquiry_processed(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<ProcessedRequest>,
) -> Result<Json<Inquiry>, ApiError> {
    Ok(Json(
        state
            .inquiry_service
            .mark_processed(id, body.processed)
            .await?,
    ))
}

// ============================================================================
// Users
// ============================================================================

async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserProfile>>, ApiError> {
    let users = state.user_service.list_users().await?;
    Ok(Json(users.iter().map(UserProfile::from).collect()))
}

async fn create_user(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateUserInput>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    let user = state.user_service.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(UserProfile::from(&user))))
}
