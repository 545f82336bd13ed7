//! Catalog read endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use domain::Product;
use serde::Deserialize;
use store::StorefrontStore;

use crate::AppState;
use crate::error::ApiError;

/// How many products the storefront landing page shows.
const DEFAULT_LATEST_LIMIT: u32 = 4;

#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
}

/// GET /products — list the newest products.
#[tracing::instrument(skip(state, query))]
pub async fn list<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LATEST_LIMIT);
    let products = state
        .store
        .list_latest_products(limit)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(products))
}

/// GET /products/{slug} — load one product by its URL slug.
#[tracing::instrument(skip(state))]
pub async fn get_by_slug<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(slug): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .store
        .find_product_by_slug(&slug)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound(format!("Product {slug} not found")))?;
    Ok(Json(product))
}
