//! Public translation tables
//!
//! - GET /api/translations/{language} - `{key: value}` for one language

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};

use crate::api::common::ApiPath;
use crate::api::middleware::{ApiError, AppState};
use crate::services::TranslationMap;

pub fn router() -> Router<AppState> {
    Router::new().route("/{language}", get(get_translations))
}

/// Unsupported languages get an empty object, not an error
async fn get_translations(
    State(state): State<AppState>,
    ApiPath(language): ApiPath<String>,
) -> Result<Json<TranslationMap>, ApiError> {
    Ok(Json(state.translation_service.map_for_language(&language).await?))
}
