//! Prometheus metrics endpoint.
//!
//! Renders the cart and checkout counters (`cart_items_added_total`,
//! `orders_created_total`, `orders_paid_total`, …) recorded by the
//! checkout services, plus the placement duration histogram.

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;

/// GET /metrics — Prometheus exposition of the storefront counters.
pub async fn render(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        handle.render(),
    )
}
