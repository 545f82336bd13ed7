//! In-memory store implementation for testing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CartId, OrderId, OwnerKey, ProductId, UserId};
use domain::{Cart, Order, OrderItem, Product, User};
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use crate::error::{Result, StoreError};
use crate::repository::{
    CartStore, CheckoutStore, CheckoutTx, OrderStore, ProductStore, UserStore,
};

#[derive(Debug, Clone, Default)]
struct State {
    products: HashMap<ProductId, Product>,
    carts: HashMap<CartId, Cart>,
    orders: HashMap<OrderId, Order>,
    users: HashMap<UserId, User>,
}

/// In-memory store with the same interface as the PostgreSQL
/// implementation.
///
/// A checkout transaction takes the single write lock for its whole
/// lifetime and mutates a working copy of the state; commit swaps the
/// copy in, rollback drops it. Writes are therefore fully serialized and
/// atomic, mirroring what the database transaction gives the Postgres
/// backend.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all records.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        *state = State::default();
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Returns the total number of order line items across all orders.
    pub async fn order_item_count(&self) -> usize {
        self.state
            .read()
            .await
            .orders
            .values()
            .map(|order| order.items.len())
            .sum()
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn find_product_by_slug(&self, slug: &str) -> Result<Option<Product>> {
        Ok(self
            .state
            .read()
            .await
            .products
            .values()
            .find(|p| p.slug == slug)
            .cloned())
    }

    async fn list_latest_products(&self, limit: u32) -> Result<Vec<Product>> {
        let state = self.state.read().await;
        let mut products: Vec<Product> = state.products.values().cloned().collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        products.truncate(limit as usize);
        Ok(products)
    }

    async fn upsert_product(&self, product: &Product) -> Result<()> {
        let mut state = self.state.write().await;
        state.products.insert(product.id, product.clone());
        Ok(())
    }
}

#[async_trait]
impl CartStore for InMemoryStore {
    async fn find_cart(&self, owner: OwnerKey) -> Result<Option<Cart>> {
        Ok(self
            .state
            .read()
            .await
            .carts
            .values()
            .find(|cart| cart.owner() == owner)
            .cloned())
    }

    async fn upsert_cart(&self, cart: &Cart) -> Result<()> {
        let mut state = self.state.write().await;
        state.carts.insert(cart.id(), cart.clone());
        Ok(())
    }

    async fn delete_cart(&self, id: CartId) -> Result<()> {
        let mut state = self.state.write().await;
        state.carts.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.state.read().await.orders.get(&id).cloned())
    }

    async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn set_delivered(&self, id: OrderId, delivered_at: DateTime<Utc>) -> Result<()> {
        let mut state = self.state.write().await;
        let order = state
            .orders
            .get_mut(&id)
            .ok_or(StoreError::NotFound { entity: "order" })?;
        order.is_delivered = true;
        order.delivered_at = Some(delivered_at);
        Ok(())
    }

    async fn delete_order(&self, id: OrderId) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .orders
            .remove(&id)
            .ok_or(StoreError::NotFound { entity: "order" })?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn upsert_user(&self, user: &User) -> Result<()> {
        let mut state = self.state.write().await;
        state.users.insert(user.id, user.clone());
        Ok(())
    }
}

/// Open transaction against the in-memory store.
pub struct InMemoryTx {
    guard: OwnedRwLockWriteGuard<State>,
    working: State,
}

#[async_trait]
impl CheckoutStore for InMemoryStore {
    type Tx = InMemoryTx;

    async fn begin(&self) -> Result<Self::Tx> {
        let guard = Arc::clone(&self.state).write_owned().await;
        let working = guard.clone();
        Ok(InMemoryTx { guard, working })
    }
}

#[async_trait]
impl CheckoutTx for InMemoryTx {
    async fn insert_order(&mut self, order: &Order) -> Result<()> {
        let row = Order {
            items: Vec::new(),
            ..order.clone()
        };
        self.working.orders.insert(row.id, row);
        Ok(())
    }

    async fn insert_order_items(&mut self, order_id: OrderId, items: &[OrderItem]) -> Result<()> {
        let order = self
            .working
            .orders
            .get_mut(&order_id)
            .ok_or(StoreError::NotFound { entity: "order" })?;
        order.items.extend_from_slice(items);
        Ok(())
    }

    async fn reset_cart(&mut self, cart_id: CartId) -> Result<()> {
        let cart = self
            .working
            .carts
            .get_mut(&cart_id)
            .ok_or(StoreError::NotFound { entity: "cart" })?;
        cart.reset();
        Ok(())
    }

    async fn decrement_stock(&mut self, product_id: ProductId, qty: u32) -> Result<()> {
        let product = self
            .working
            .products
            .get_mut(&product_id)
            .ok_or(StoreError::NotFound { entity: "product" })?;
        if product.stock < qty {
            return Err(StoreError::StockConflict {
                product_id,
                requested: qty,
                available: product.stock,
            });
        }
        product.stock -= qty;
        Ok(())
    }

    async fn set_paid(&mut self, order_id: OrderId, paid_at: DateTime<Utc>) -> Result<()> {
        let order = self
            .working
            .orders
            .get_mut(&order_id)
            .ok_or(StoreError::NotFound { entity: "order" })?;
        if order.is_paid {
            return Err(StoreError::AlreadySettled { order_id });
        }
        order.is_paid = true;
        order.paid_at = Some(paid_at);
        Ok(())
    }

    async fn commit(mut self) -> Result<()> {
        *self.guard = self.working;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        Ok(())
    }
}
