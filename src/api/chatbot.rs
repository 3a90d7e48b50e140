//! Chatbot endpoints
//!
//! - POST /api/chatbot/query - Answer a visitor question
//! - POST /api/chatbot/suggestions - Product categories for a farming problem

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::common::ApiJson;
use crate::api::middleware::{ApiError, AppState};
use crate::services::ChatbotReply;

#[derive(Debug, Deserialize)]
pub struct ChatQuery {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/query", post(query))
        .route("/suggestions", post(suggestions))
}

fn require_query(query: &str) -> Result<&str, ApiError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ApiError::validation_error("Query is required"));
    }
    Ok(query)
}

/// POST /api/chatbot/query
async fn query(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ChatQuery>,
) -> Result<Json<ChatbotReply>, ApiError> {
    let query = require_query(&body.query)?;
    Ok(Json(
        state
            .chatbot_service
            .query(query, body.context.as_deref())
            .await,
    ))
}

/// POST /api/chatbot/suggestions
async fn suggestions(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ChatQuery>,
) -> Result<Json<SuggestionsResponse>, ApiError> {
    let query = require_query(&body.query)?;
    Ok(Json(SuggestionsResponse {
        suggestions: state.chatbot_service.suggestions(query).await,
    }))
}
