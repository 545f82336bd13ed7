//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Checkout workflow error.
    Checkout(CheckoutError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, String) {
    let status = match &err {
        CheckoutError::Unauthenticated => StatusCode::UNAUTHORIZED,
        CheckoutError::NoSession => StatusCode::BAD_REQUEST,
        CheckoutError::UserNotFound
        | CheckoutError::ProductNotFound
        | CheckoutError::CartNotFound
        | CheckoutError::ItemNotFound { .. }
        | CheckoutError::OrderNotFound => StatusCode::NOT_FOUND,
        CheckoutError::OutOfStock { .. }
        | CheckoutError::InsufficientStock { .. }
        | CheckoutError::MissingAddress
        | CheckoutError::MissingPaymentMethod
        | CheckoutError::EmptyCart
        | CheckoutError::AlreadyPaid
        | CheckoutError::NotPaid
        | CheckoutError::AlreadyDelivered => StatusCode::CONFLICT,
        CheckoutError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CheckoutError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "checkout store failure");
    }
    (status, err.to_string())
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}
