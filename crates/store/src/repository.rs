//! Repository traits and the checkout unit of work.
//!
//! Reads and single-record writes go through the per-entity repository
//! traits. The multi-record checkout operations (order creation, payment
//! settlement) go through [`CheckoutStore::begin`], which hands out a
//! [`CheckoutTx`] with explicit commit/rollback: every step runs under one
//! handle and none of it is visible until `commit` returns.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CartId, OrderId, OwnerKey, ProductId, UserId};
use domain::{Cart, Order, OrderItem, Product, User};

use crate::error::Result;

/// Read access to the product catalog, plus the admin write path.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Loads a product by id.
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Loads a product by its URL slug.
    async fn find_product_by_slug(&self, slug: &str) -> Result<Option<Product>>;

    /// Lists the most recently added products, newest first.
    async fn list_latest_products(&self, limit: u32) -> Result<Vec<Product>>;

    /// Inserts or replaces a product (admin/seed path).
    async fn upsert_product(&self, product: &Product) -> Result<()>;
}

/// Cart persistence, keyed by owner.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Finds the cart owned by the given key, if any.
    async fn find_cart(&self, owner: OwnerKey) -> Result<Option<Cart>>;

    /// Inserts or replaces a cart.
    async fn upsert_cart(&self, cart: &Cart) -> Result<()>;

    /// Deletes a cart. Missing carts are not an error.
    async fn delete_cart(&self, id: CartId) -> Result<()>;
}

/// Order reads and single-field lifecycle writes.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Loads an order with its items.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Lists a user's orders, newest first.
    async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>>;

    /// Marks an order delivered. Single-row write; the state guard runs in
    /// the coordinator before this is called.
    async fn set_delivered(&self, id: OrderId, delivered_at: DateTime<Utc>) -> Result<()>;

    /// Deletes an order and its items.
    async fn delete_order(&self, id: OrderId) -> Result<()>;
}

/// Read access to user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Loads a user by id.
    async fn get_user(&self, id: UserId) -> Result<Option<User>>;

    /// Inserts or replaces a user (seed path).
    async fn upsert_user(&self, user: &User) -> Result<()>;
}

/// Entry point for the checkout unit of work.
#[async_trait]
pub trait CheckoutStore: Send + Sync {
    /// The transaction handle type for this backend.
    type Tx: CheckoutTx;

    /// Begins a transaction.
    async fn begin(&self) -> Result<Self::Tx>;
}

/// An open checkout transaction.
///
/// Dropping the handle without calling [`commit`](CheckoutTx::commit)
/// discards every staged write.
#[async_trait]
pub trait CheckoutTx: Send {
    /// Inserts the order row (without its items).
    async fn insert_order(&mut self, order: &Order) -> Result<()>;

    /// Inserts the order's line items, referencing the order row.
    async fn insert_order_items(&mut self, order_id: OrderId, items: &[OrderItem]) -> Result<()>;

    /// Empties a cart and zeroes its four price fields.
    async fn reset_cart(&mut self, cart_id: CartId) -> Result<()>;

    /// Conditionally decrements product stock: takes `qty` units only if
    /// at least that many are on hand, otherwise fails with
    /// [`StoreError::StockConflict`](crate::StoreError::StockConflict).
    async fn decrement_stock(&mut self, product_id: ProductId, qty: u32) -> Result<()>;

    /// Sets the paid flag and timestamp on an order.
    async fn set_paid(&mut self, order_id: OrderId, paid_at: DateTime<Utc>) -> Result<()>;

    /// Commits every staged write atomically.
    async fn commit(self) -> Result<()>;

    /// Discards every staged write.
    async fn rollback(self) -> Result<()>;
}

/// The full store surface the checkout services are generic over.
pub trait StorefrontStore:
    ProductStore + CartStore + OrderStore + UserStore + CheckoutStore + Clone + Send + Sync + 'static
{
}

impl<T> StorefrontStore for T where
    T: ProductStore
        + CartStore
        + OrderStore
        + UserStore
        + CheckoutStore
        + Clone
        + Send
        + Sync
        + 'static
{
}
