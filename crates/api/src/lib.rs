//! HTTP API server for the storefront.
//!
//! Exposes catalog reads, cart mutations, and the order lifecycle over
//! REST, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod identity;
pub mod routes;
pub mod seed;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use checkout::{CartService, CheckoutCoordinator, InMemoryNotificationService};
use metrics_exporter_prometheus::PrometheusHandle;
use store::StorefrontStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<S: StorefrontStore> {
    pub carts: CartService<S>,
    pub coordinator: CheckoutCoordinator<S, InMemoryNotificationService>,
    pub store: S,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: StorefrontStore>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/products", get(routes::products::list::<S>))
        .route("/products/{slug}", get(routes::products::get_by_slug::<S>))
        .route("/cart", get(routes::cart::get::<S>))
        .route("/cart/items", post(routes::cart::add_item::<S>))
        .route(
            "/cart/items/{product_id}",
            delete(routes::cart::remove_item::<S>),
        )
        .route("/orders", post(routes::orders::create::<S>))
        .route("/orders", get(routes::orders::list::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route("/orders/{id}", delete(routes::orders::delete::<S>))
        .route("/orders/{id}/pay", post(routes::orders::pay::<S>))
        .route("/orders/{id}/deliver", post(routes::orders::deliver::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state over the given store backend.
pub fn create_default_state<S: StorefrontStore>(store: S) -> Arc<AppState<S>> {
    let notifier = InMemoryNotificationService::new();
    Arc::new(AppState {
        carts: CartService::new(store.clone()),
        coordinator: CheckoutCoordinator::new(store.clone(), notifier),
        store,
    })
}
