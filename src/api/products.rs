//! Public product catalog endpoints
//!
//! - GET /api/products - Active products, optionally filtered by `?category=`
//! - GET /api/products/{id} - One active product

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::common::{ApiPath, ApiQuery};
use crate::api::middleware::{ApiError, AppState};
use crate::models::Product;

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/{id}", get(get_product))
}

/// GET /api/products
async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state
        .product_service
        .list_public(query.category.as_deref())
        .await?;
    Ok(Json(products))
}

/// GET /api/products/{id}
///
/// Inactive products are reported as missing.
async fn get_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.product_service.get_public(id).await?))
}
