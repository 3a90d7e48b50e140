//! API middleware
//!
//! Contains middleware for:
//! - Authentication (bearer token validation)
//! - Authorization (role checks per route group)
//! - Request statistics
//!
//! Also defines the shared `AppState` and the JSON error body returned by
//! every handler.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::models::{User, UserRole};
use crate::services::{
    blog::BlogServiceError, export_market::ExportMarketServiceError, inquiry::InquiryServiceError,
    lead::LeadServiceError, product::ProductServiceError, translation::TranslationServiceError,
    user::UserServiceError, BlogService, ChatbotService, DashboardService, ExportMarketService,
    InquiryService, LeadService, ProductService, RateLimiter, TranslationService, UserService,
};

// ============================================================================
// Request Statistics
// ============================================================================

/// Lightweight request statistics using atomic operations (no locks)
pub struct RequestStats {
    total_requests: AtomicU64,
    /// Sum of response times in microseconds
    total_response_time_us: AtomicU64,
    start_time: Instant,
}

impl RequestStats {
    pub fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            total_response_time_us: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a request with its response time
    pub fn record(&self, duration_us: u64) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_response_time_us.fetch_add(duration_us, Ordering::Relaxed);
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    /// Average response time in microseconds
    pub fn avg_response_time_us(&self) -> f64 {
        let total = self.total_requests.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        let total_time = self.total_response_time_us.load(Ordering::Relaxed);
        total_time as f64 / total as f64
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for RequestStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub product_service: Arc<ProductService>,
    pub lead_service: Arc<LeadService>,
    pub inquiry_service: Arc<InquiryService>,
    pub blog_service: Arc<BlogService>,
    pub translation_service: Arc<TranslationService>,
    pub export_market_service: Arc<ExportMarketService>,
    pub dashboard_service: Arc<DashboardService>,
    pub chatbot_service: Arc<ChatbotService>,
    pub rate_limiter: Arc<RateLimiter>,
    pub request_stats: Arc<RequestStats>,
}

/// Authenticated user extracted from request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

// ============================================================================
// Errors
// ============================================================================

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new("RATE_LIMIT", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    /// Log the cause and hide it from the client
    pub fn internal(err: impl std::fmt::Display) -> Self {
        tracing::error!("Internal error: {}", err);
        Self::internal_error("Internal server error")
    }

    pub fn status(&self) -> StatusCode {
        match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            "RATE_LIMIT" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<UserServiceError> for ApiError {
    fn from(e: UserServiceError) -> Self {
        match e {
            UserServiceError::AuthenticationError(msg) => ApiError::unauthorized(msg),
            UserServiceError::InvalidToken(_) => ApiError::forbidden("Invalid or expired token"),
            UserServiceError::TokenExpired => ApiError::forbidden("Invalid or expired token"),
            UserServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            UserServiceError::UserExists(msg) => ApiError::conflict(msg),
            UserServiceError::InternalError(e) => ApiError::internal(e),
        }
    }
}

impl From<ProductServiceError> for ApiError {
    fn from(e: ProductServiceError) -> Self {
        match e {
            ProductServiceError::NotFound(_) => ApiError::not_found("Product not found"),
            ProductServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            ProductServiceError::InternalError(e) => ApiError::internal(e),
        }
    }
}

impl From<LeadServiceError> for ApiError {
    fn from(e: LeadServiceError) -> Self {
        match e {
            LeadServiceError::NotFound(_) => ApiError::not_found("Lead not found"),
            LeadServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            LeadServiceError::InternalError(e) => ApiError::internal(e),
        }
    }
}

impl From<InquiryServiceError> for ApiError {
    fn from(e: InquiryServiceError) -> Self {
        match e {
            InquiryServiceError::NotFound(_) => ApiError::not_found("Inquiry not found"),
            InquiryServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            InquiryServiceError::InternalError(e) => ApiError::internal(e),
        }
    }
}

impl From<BlogServiceError> for ApiError {
    fn from(e: BlogServiceError) -> Self {
        match e {
            BlogServiceError::NotFound(_) => ApiError::not_found("Blog post not found"),
            BlogServiceError::Conflict(msg) => ApiError::conflict(msg),
            BlogServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            BlogServiceError::InternalError(e) => ApiError::internal(e),
        }
    }
}

impl From<TranslationServiceError> for ApiError {
    fn from(e: TranslationServiceError) -> Self {
        match e {
            TranslationServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            TranslationServiceError::InternalError(e) => ApiError::internal(e),
        }
    }
}

impl From<ExportMarketServiceError> for ApiError {
    fn from(e: ExportMarketServiceError) -> Self {
        match e {
            ExportMarketServiceError::NotFound(_) => ApiError::not_found("Export market not found"),
            ExportMarketServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            ExportMarketServiceError::InternalError(e) => ApiError::internal(e),
        }
    }
}

// ============================================================================
// Authentication & authorization
// ============================================================================

/// Extract the bearer token from the Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Client address as reported by a fronting proxy
pub fn extract_ip_address(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            // First entry is the original client
            if let Some(ip) = forwarded_str.split(',').next() {
                let ip = ip.trim();
                if !ip.is_empty() {
                    return Some(ip.to_string());
                }
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return Some(ip_str.trim().to_string());
        }
    }

    None
}

/// Apply the public submission limit (10 per client per minute).
///
/// Requests with no identifiable client address are not limited.
pub async fn check_submission_limit(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(ip) = extract_ip_address(headers) else {
        return Ok(());
    };
    if state.rate_limiter.try_record_submission(&ip).await {
        return Ok(());
    }
    tracing::warn!("Submission rate limit hit for {}", ip);
    Err(ApiError::with_details(
        "RATE_LIMIT",
        "Too many submissions, please try again shortly",
        serde_json::json!({"retry_after": 60}),
    ))
}

/// Authentication middleware.
///
/// No token is a 401; a token that fails verification, has expired, or names
/// a user that no longer exists is a 403.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())
        .ok_or_else(|| ApiError::unauthorized("Access token required"))?;

    let user = state
        .user_service
        .authenticate(&token)
        .await
        .map_err(ApiError::from)?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

fn check_role(request: &Request, roles: &[UserRole]) -> Result<(), ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.0.has_any_role(roles) {
        return Err(ApiError::forbidden("Insufficient permissions"));
    }
    Ok(())
}

/// Admin only
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    check_role(&request, &[UserRole::Admin])?;
    Ok(next.run(request).await)
}

/// Catalog, content and translations: admin or marketing manager
pub async fn require_content_staff(request: Request, next: Next) -> Result<Response, ApiError> {
    check_role(&request, &[UserRole::Admin, UserRole::MarketingManager])?;
    Ok(next.run(request).await)
}

/// Lead pipeline and inquiries: any staff role
pub async fn require_sales_staff(request: Request, next: Next) -> Result<Response, ApiError> {
    check_role(
        &request,
        &[UserRole::Admin, UserRole::MarketingManager, UserRole::SalesTeam],
    )?;
    Ok(next.run(request).await)
}

/// Request statistics middleware
///
/// Records request count and response time for the health endpoint.
pub async fn request_stats_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let response = next.run(request).await;
    state
        .request_stats
        .record(start.elapsed().as_micros() as u64);
    response
}
