//! Public blog endpoints
//!
//! - GET /api/blog-posts - Published posts, newest first
//! - GET /api/blog-posts/{slug} - One published post

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};

use crate::api::common::ApiPath;
use crate::api::middleware::{ApiError, AppState};
use crate::models::BlogPost;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts))
        .route("/{slug}", get(get_post))
}

async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<BlogPost>>, ApiError> {
    Ok(Json(state.blog_service.list_published().await?))
}

async fn get_post(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> Result<Json<BlogPost>, ApiError> {
    Ok(Json(state.blog_service.get_published_by_slug(&slug).await?))
}
