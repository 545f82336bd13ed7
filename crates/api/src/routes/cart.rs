//! Cart endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use common::ProductId;
use domain::Cart;
use serde::{Deserialize, Serialize};
use store::StorefrontStore;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::identity::Identity;

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: Uuid,
}

#[derive(Serialize)]
pub struct CartActionResponse {
    pub success: bool,
    pub message: String,
}

/// GET /cart — the caller's cart, `null` when none exists yet.
#[tracing::instrument(skip(state, identity))]
pub async fn get<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
) -> Result<Json<Option<Cart>>, ApiError> {
    let cart = state.carts.get_cart(&identity.0).await?;
    Ok(Json(cart))
}

/// POST /cart/items — add one unit of a product to the caller's cart.
#[tracing::instrument(skip(state, identity, req))]
pub async fn add_item<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CartActionResponse>, ApiError> {
    let outcome = state
        .carts
        .try_add_item(&identity.0, ProductId::from_uuid(req.product_id), Utc::now())
        .await?;
    Ok(Json(CartActionResponse {
        success: outcome.success,
        message: outcome.message,
    }))
}

/// DELETE /cart/items/{product_id} — remove one unit of a product.
#[tracing::instrument(skip(state, identity))]
pub async fn remove_item<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(product_id): Path<Uuid>,
) -> Result<Json<CartActionResponse>, ApiError> {
    let outcome = state
        .carts
        .try_remove_item(&identity.0, ProductId::from_uuid(product_id))
        .await?;
    Ok(Json(CartActionResponse {
        success: outcome.success,
        message: outcome.message,
    }))
}
