//! Authentication API endpoints
//!
//! - POST /api/auth/login - Login, returns a bearer token
//! - POST /api/auth/register - Public sign-up (`user` role only)
//! - GET /api/auth/me - Current user

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::common::ApiJson;
use crate::api::middleware::{check_submission_limit, ApiError, AppState, AuthenticatedUser};
use crate::models::UserProfile;
use crate::services::user::{LoginInput, LoginResult, UserServiceError};

/// Request body for staff login. Both fields are checked by hand so a missing
/// one is a validation error rather than a rejected body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Defaults to the email address
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserProfile,
}

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
}

pub fn protected_router() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<LoginResult>, ApiError> {
    let (username, password) = match (body.username, body.password) {
        (Some(u), Some(p)) if !u.trim().is_empty() && !p.is_empty() => (u.trim().to_string(), p),
        _ => return Err(ApiError::validation_error("Username and password are required")),
    };

    // 5 failed attempts per username per 15 minutes
    if state.rate_limiter.is_username_limited(&username).await {
        tracing::warn!("Login rate limit hit for {}", username);
        return Err(ApiError::with_details(
            "RATE_LIMIT",
            "Too many failed login attempts, try again later",
            serde_json::json!({"retry_after": 900}),
        ));
    }

    match state
        .user_service
        .login(LoginInput::new(username.clone(), password))
        .await
    {
        Ok(result) => {
            state.rate_limiter.clear_username(&username).await;
            Ok(Json(result))
        }
        Err(e @ UserServiceError::AuthenticationError(_)) => {
            state.rate_limiter.record_failed_login(&username).await;
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /api/auth/register - shares the public submission limit
async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    check_submission_limit(&state, &headers).await?;

    let user = state
        .user_service
        .register(body.username, body.email, body.password, body.name)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            user: UserProfile::from(&user),
        }),
    ))
}

/// GET /api/auth/me
async fn me(Extension(user): Extension<AuthenticatedUser>) -> Json<MeResponse> {
    Json(MeResponse {
        user: UserProfile::from(&user.0),
    })
}
