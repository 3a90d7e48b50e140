//! Public export market list
//!
//! - GET /api/export-markets

use axum::{extract::State, routing::get, Json, Router};

use crate::api::middleware::{ApiError, AppState};
use crate::models::ExportMarket;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_markets))
}

async fn list_markets(State(state): State<AppState>) -> Result<Json<Vec<ExportMarket>>, ApiError> {
    Ok(Json(state.export_market_service.list_active().await?))
}
