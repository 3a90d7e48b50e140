//! Public inquiry submission
//!
//! - POST /api/inquiries - Contact, quote or product inquiry; creates a lead

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use crate::api::common::ApiJson;
use crate::api::middleware::{check_submission_limit, ApiError, AppState};
use crate::models::InquiryType;
use crate::services::Submission;

#[derive(Debug, Deserialize)]
pub struct InquiryRequest {
    #[serde(rename = "type")]
    pub inquiry_type: InquiryType,
    #[serde(default)]
    pub data: serde_json::Value,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(submit_inquiry))
}

/// POST /api/inquiries
async fn submit_inquiry(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<InquiryRequest>,
) -> Result<(StatusCode, Json<Submission>), ApiError> {
    check_submission_limit(&state, &headers).await?;

    let submission = state
        .inquiry_service
        .submit(body.inquiry_type, body.data)
        .await?;
    Ok((StatusCode::CREATED, Json(submission)))
}
