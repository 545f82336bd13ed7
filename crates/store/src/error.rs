use common::{OrderId, ProductId};
use thiserror::Error;

/// Errors that can occur when interacting with the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("{entity} not found")]
    NotFound {
        /// Entity kind that was looked up.
        entity: &'static str,
    },

    /// A conditional stock decrement found fewer units than requested.
    /// The surrounding transaction must roll back.
    #[error(
        "insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    StockConflict {
        /// Product whose stock ran out.
        product_id: ProductId,
        /// Units the settlement tried to take.
        requested: u32,
        /// Units actually on hand.
        available: u32,
    },

    /// A conditional paid flip found the order already settled. The
    /// surrounding transaction must roll back.
    #[error("order {order_id} is already paid")]
    AlreadySettled {
        /// Order that was already paid.
        order_id: OrderId,
    },

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
