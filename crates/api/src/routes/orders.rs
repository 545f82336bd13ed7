//! Order placement and fulfillment endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use common::OrderId;
use domain::Order;
use serde::Serialize;
use store::StorefrontStore;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::identity::Identity;

#[derive(Serialize)]
pub struct PlaceOrderResponse {
    pub success: bool,
    pub message: String,
    pub redirect_to: Option<String>,
    pub order_id: Option<String>,
}

#[derive(Serialize)]
pub struct OrderActionResponse {
    pub success: bool,
    pub message: String,
}

/// POST /orders — place an order from the signed-in caller's cart.
///
/// A missing checkout precondition (no address, no payment method, empty
/// cart) answers 409 with the page that fixes it; everything else maps
/// through [`ApiError`].
#[tracing::instrument(skip(state, identity))]
pub async fn create<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
) -> Result<(StatusCode, Json<PlaceOrderResponse>), ApiError> {
    match state.coordinator.try_create_order(&identity.0, Utc::now()).await {
        Ok(order_id) => Ok((
            StatusCode::CREATED,
            Json(PlaceOrderResponse {
                success: true,
                message: "Order created".to_string(),
                redirect_to: Some(format!("/order/{order_id}")),
                order_id: Some(order_id.to_string()),
            }),
        )),
        Err(err) => match err.redirect_to() {
            Some(redirect) => Ok((
                StatusCode::CONFLICT,
                Json(PlaceOrderResponse {
                    success: false,
                    message: err.to_string(),
                    redirect_to: Some(redirect.to_string()),
                    order_id: None,
                }),
            )),
            None => Err(err.into()),
        },
    }
}

/// GET /orders — the signed-in caller's orders, newest first.
#[tracing::instrument(skip(state, identity))]
pub async fn list<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
) -> Result<Json<Vec<Order>>, ApiError> {
    let user_id = identity
        .0
        .user_id
        .ok_or(ApiError::Checkout(checkout::CheckoutError::Unauthenticated))?;
    let orders = state
        .store
        .list_orders_for_user(user_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(orders))
}

/// GET /orders/{id} — load one order with its items.
#[tracing::instrument(skip(state))]
pub async fn get<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, ApiError> {
    let order = state.coordinator.get_order(OrderId::from_uuid(id)).await?;
    Ok(Json(order))
}

/// POST /orders/{id}/pay — settle an order as paid.
#[tracing::instrument(skip(state))]
pub async fn pay<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderActionResponse>, ApiError> {
    state
        .coordinator
        .try_update_order_to_paid(OrderId::from_uuid(id), Utc::now())
        .await?;
    Ok(Json(OrderActionResponse {
        success: true,
        message: "Order marked as paid".to_string(),
    }))
}

/// POST /orders/{id}/deliver — mark a paid order delivered.
#[tracing::instrument(skip(state))]
pub async fn deliver<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderActionResponse>, ApiError> {
    state
        .coordinator
        .try_deliver_order(OrderId::from_uuid(id), Utc::now())
        .await?;
    Ok(Json(OrderActionResponse {
        success: true,
        message: "Order has been marked delivered".to_string(),
    }))
}

/// DELETE /orders/{id} — delete an order (admin path).
#[tracing::instrument(skip(state))]
pub async fn delete<S: StorefrontStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderActionResponse>, ApiError> {
    state
        .coordinator
        .try_delete_order(OrderId::from_uuid(id))
        .await?;
    Ok(Json(OrderActionResponse {
        success: true,
        message: "Order deleted successfully".to_string(),
    }))
}
