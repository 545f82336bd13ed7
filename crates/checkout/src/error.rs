use common::ProductId;
use domain::{AssemblyError, FulfillmentError};
use store::StoreError;
use thiserror::Error;

/// Errors from the checkout workflows.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The operation requires a signed-in user.
    #[error("user is not authenticated")]
    Unauthenticated,

    /// The caller carries neither a user nor a session identity.
    #[error("cart session not found")]
    NoSession,

    /// The signed-in user has no record.
    #[error("user not found")]
    UserNotFound,

    /// The product does not exist in the catalog.
    #[error("product not found")]
    ProductNotFound,

    /// The caller has no cart.
    #[error("cart not found")]
    CartNotFound,

    /// The product has no line item in the caller's cart.
    #[error("{name} is not in the cart")]
    ItemNotFound {
        /// Product name for the message.
        name: String,
    },

    /// The add-to-cart guard found not enough units on hand.
    #[error("not enough stock of {name}")]
    OutOfStock {
        /// Product name for the message.
        name: String,
    },

    /// Settlement tried to take more units than were on hand. The whole
    /// settlement rolled back.
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        /// Product whose stock ran out.
        product_id: ProductId,
        /// Units the settlement tried to take.
        requested: u32,
        /// Units actually on hand.
        available: u32,
    },

    /// The user has no shipping address on file.
    #[error("no shipping address")]
    MissingAddress,

    /// The user has no payment method on file.
    #[error("no payment method")]
    MissingPaymentMethod,

    /// The cart has no line items.
    #[error("your cart is empty")]
    EmptyCart,

    /// The order does not exist.
    #[error("order not found")]
    OrderNotFound,

    /// The order is already paid.
    #[error("order is already paid")]
    AlreadyPaid,

    /// The order is not paid yet.
    #[error("order is not paid")]
    NotPaid,

    /// The order is already delivered.
    #[error("order is already delivered")]
    AlreadyDelivered,

    /// Input validation failed; one entry per broken rule.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// The store failed.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl CheckoutError {
    /// The page the caller should be sent to when this error means a
    /// checkout precondition is unmet, rather than a hard failure.
    pub fn redirect_to(&self) -> Option<&'static str> {
        match self {
            Self::MissingAddress => Some("/shipping-address"),
            Self::MissingPaymentMethod => Some("/payment-method"),
            Self::EmptyCart => Some("/cart"),
            _ => None,
        }
    }
}

impl From<AssemblyError> for CheckoutError {
    fn from(err: AssemblyError) -> Self {
        match err {
            AssemblyError::MissingAddress => Self::MissingAddress,
            AssemblyError::MissingPaymentMethod => Self::MissingPaymentMethod,
            AssemblyError::EmptyCart => Self::EmptyCart,
        }
    }
}

impl From<FulfillmentError> for CheckoutError {
    fn from(err: FulfillmentError) -> Self {
        match err {
            FulfillmentError::AlreadyPaid => Self::AlreadyPaid,
            FulfillmentError::NotPaid => Self::NotPaid,
            FulfillmentError::AlreadyDelivered => Self::AlreadyDelivered,
        }
    }
}

impl From<StoreError> for CheckoutError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::StockConflict {
                product_id,
                requested,
                available,
            } => Self::InsufficientStock {
                product_id,
                requested,
                available,
            },
            StoreError::AlreadySettled { .. } => Self::AlreadyPaid,
            other => Self::Store(other),
        }
    }
}

/// Result type for checkout operations.
pub type Result<T> = std::result::Result<T, CheckoutError>;
