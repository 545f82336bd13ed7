use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CartId, Money, OrderId, OwnerKey, ProductId, SessionId, UserId};
use domain::{Cart, CartItem, Order, OrderItem, Product, ShippingAddress, User};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::repository::{
    CartStore, CheckoutStore, CheckoutTx, OrderStore, ProductStore, UserStore,
};

/// PostgreSQL-backed storefront store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            image: row.try_get("image")?,
            price: Money::from_cents(row.try_get::<i64, _>("price_cents")?),
            stock: row.try_get::<i32, _>("stock")? as u32,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_cart(row: PgRow) -> Result<Cart> {
        let owner = match (
            row.try_get::<Option<Uuid>, _>("user_id")?,
            row.try_get::<Option<Uuid>, _>("session_id")?,
        ) {
            (Some(user_id), _) => OwnerKey::User(UserId::from_uuid(user_id)),
            (None, Some(session_id)) => OwnerKey::Session(SessionId::from_uuid(session_id)),
            (None, None) => return Err(StoreError::NotFound { entity: "cart owner" }),
        };
        let items_json: serde_json::Value = row.try_get("items")?;
        let items: Vec<CartItem> = serde_json::from_value(items_json)?;

        Ok(Cart::from_parts(
            CartId::from_uuid(row.try_get::<Uuid, _>("id")?),
            owner,
            items,
            row.try_get::<DateTime<Utc>, _>("created_at")?,
        ))
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let address_json: serde_json::Value = row.try_get("shipping_address")?;
        let shipping_address: ShippingAddress = serde_json::from_value(address_json)?;

        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            shipping_address,
            payment_method: row.try_get("payment_method")?,
            items: Vec::new(),
            items_price: Money::from_cents(row.try_get::<i64, _>("items_price_cents")?),
            shipping_price: Money::from_cents(row.try_get::<i64, _>("shipping_price_cents")?),
            tax_price: Money::from_cents(row.try_get::<i64, _>("tax_price_cents")?),
            total_price: Money::from_cents(row.try_get::<i64, _>("total_price_cents")?),
            is_paid: row.try_get("is_paid")?,
            paid_at: row.try_get("paid_at")?,
            is_delivered: row.try_get("is_delivered")?,
            delivered_at: row.try_get("delivered_at")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_order_item(row: PgRow) -> Result<OrderItem> {
        Ok(OrderItem {
            product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            image: row.try_get("image")?,
            price: Money::from_cents(row.try_get::<i64, _>("price_cents")?),
            qty: row.try_get::<i32, _>("qty")? as u32,
        })
    }

    async fn load_order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query(
            r#"
            SELECT product_id, name, slug, image, price_cents, qty
            FROM order_items
            WHERE order_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order_item).collect()
    }
}

#[async_trait]
impl ProductStore for PostgresStore {
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(
            "SELECT id, name, slug, image, price_cents, stock, created_at FROM products WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn find_product_by_slug(&self, slug: &str) -> Result<Option<Product>> {
        let row = sqlx::query(
            "SELECT id, name, slug, image, price_cents, stock, created_at FROM products WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn list_latest_products(&self, limit: u32) -> Result<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, slug, image, price_cents, stock, created_at
            FROM products
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn upsert_product(&self, product: &Product) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, slug, image, price_cents, stock, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                slug = EXCLUDED.slug,
                image = EXCLUDED.image,
                price_cents = EXCLUDED.price_cents,
                stock = EXCLUDED.stock
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.image)
        .bind(product.price.cents())
        .bind(product.stock as i32)
        .bind(product.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CartStore for PostgresStore {
    async fn find_cart(&self, owner: OwnerKey) -> Result<Option<Cart>> {
        let row = match owner {
            OwnerKey::User(user_id) => {
                sqlx::query(
                    "SELECT id, user_id, session_id, items, created_at FROM carts WHERE user_id = $1",
                )
                .bind(user_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?
            }
            OwnerKey::Session(session_id) => {
                sqlx::query(
                    "SELECT id, user_id, session_id, items, created_at FROM carts WHERE session_id = $1",
                )
                .bind(session_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?
            }
        };

        row.map(Self::row_to_cart).transpose()
    }

    async fn upsert_cart(&self, cart: &Cart) -> Result<()> {
        let (user_id, session_id) = match cart.owner() {
            OwnerKey::User(id) => (Some(id.as_uuid()), None),
            OwnerKey::Session(id) => (None, Some(id.as_uuid())),
        };
        let items_json = serde_json::to_value(cart.items())?;

        sqlx::query(
            r#"
            INSERT INTO carts (id, user_id, session_id, items, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                user_id = EXCLUDED.user_id,
                session_id = EXCLUDED.session_id,
                items = EXCLUDED.items
            "#,
        )
        .bind(cart.id().as_uuid())
        .bind(user_id)
        .bind(session_id)
        .bind(items_json)
        .bind(cart.created_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_cart(&self, id: CartId) -> Result<()> {
        sqlx::query("DELETE FROM carts WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, shipping_address, payment_method,
                   items_price_cents, shipping_price_cents, tax_price_cents, total_price_cents,
                   is_paid, paid_at, is_delivered, delivered_at, created_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let mut order = Self::row_to_order(row)?;
                order.items = self.load_order_items(order.id).await?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, shipping_address, payment_method,
                   items_price_cents, shipping_price_cents, tax_price_cents, total_price_cents,
                   is_paid, paid_at, is_delivered, delivered_at, created_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let mut order = Self::row_to_order(row)?;
            order.items = self.load_order_items(order.id).await?;
            orders.push(order);
        }
        Ok(orders)
    }

    async fn set_delivered(&self, id: OrderId, delivered_at: DateTime<Utc>) -> Result<()> {
        let result = sqlx::query(
            "UPDATE orders SET is_delivered = TRUE, delivered_at = $2 WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(delivered_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: "order" });
        }
        Ok(())
    }

    async fn delete_order(&self, id: OrderId) -> Result<()> {
        // order_items go with it via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: "order" });
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, name, email, address, payment_method FROM users WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let address = match row.try_get::<Option<serde_json::Value>, _>("address")? {
                    Some(json) => Some(serde_json::from_value(json)?),
                    None => None,
                };
                Ok(Some(User {
                    id: UserId::from_uuid(row.try_get::<Uuid, _>("id")?),
                    name: row.try_get("name")?,
                    email: row.try_get("email")?,
                    address,
                    payment_method: row.try_get("payment_method")?,
                }))
            }
            None => Ok(None),
        }
    }

    async fn upsert_user(&self, user: &User) -> Result<()> {
        let address_json = match &user.address {
            Some(address) => Some(serde_json::to_value(address)?),
            None => None,
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, address, payment_method)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                email = EXCLUDED.email,
                address = EXCLUDED.address,
                payment_method = EXCLUDED.payment_method
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(address_json)
        .bind(&user.payment_method)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Open transaction against the PostgreSQL store.
pub struct PostgresTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CheckoutStore for PostgresStore {
    type Tx = PostgresTx;

    async fn begin(&self) -> Result<Self::Tx> {
        let tx = self.pool.begin().await?;
        Ok(PostgresTx { tx })
    }
}

#[async_trait]
impl CheckoutTx for PostgresTx {
    async fn insert_order(&mut self, order: &Order) -> Result<()> {
        let address_json = serde_json::to_value(&order.shipping_address)?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, shipping_address, payment_method,
                                items_price_cents, shipping_price_cents, tax_price_cents,
                                total_price_cents, is_paid, paid_at, is_delivered,
                                delivered_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.user_id.as_uuid())
        .bind(address_json)
        .bind(&order.payment_method)
        .bind(order.items_price.cents())
        .bind(order.shipping_price.cents())
        .bind(order.tax_price.cents())
        .bind(order.total_price.cents())
        .bind(order.is_paid)
        .bind(order.paid_at)
        .bind(order.is_delivered)
        .bind(order.delivered_at)
        .bind(order.created_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn insert_order_items(&mut self, order_id: OrderId, items: &[OrderItem]) -> Result<()> {
        for (position, item) in items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, name, slug, image,
                                         price_cents, qty, position)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(order_id.as_uuid())
            .bind(item.product_id.as_uuid())
            .bind(&item.name)
            .bind(&item.slug)
            .bind(&item.image)
            .bind(item.price.cents())
            .bind(item.qty as i32)
            .bind(position as i32)
            .execute(&mut *self.tx)
            .await?;
        }

        Ok(())
    }

    async fn reset_cart(&mut self, cart_id: CartId) -> Result<()> {
        let result = sqlx::query("UPDATE carts SET items = '[]'::jsonb WHERE id = $1")
            .bind(cart_id.as_uuid())
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: "cart" });
        }
        Ok(())
    }

    async fn decrement_stock(&mut self, product_id: ProductId, qty: u32) -> Result<()> {
        // The WHERE clause is the guard: the row only changes when enough
        // units are on hand, so concurrent settlements cannot overdraw.
        let result = sqlx::query(
            "UPDATE products SET stock = stock - $2 WHERE id = $1 AND stock >= $2",
        )
        .bind(product_id.as_uuid())
        .bind(qty as i32)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            let available: Option<i32> =
                sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
                    .bind(product_id.as_uuid())
                    .fetch_optional(&mut *self.tx)
                    .await?;

            return match available {
                Some(available) => Err(StoreError::StockConflict {
                    product_id,
                    requested: qty,
                    available: available as u32,
                }),
                None => Err(StoreError::NotFound { entity: "product" }),
            };
        }
        Ok(())
    }

    async fn set_paid(&mut self, order_id: OrderId, paid_at: DateTime<Utc>) -> Result<()> {
        // Conditional like the stock decrement: a concurrent settlement
        // that lost the race sees zero rows and must roll back.
        let result = sqlx::query(
            "UPDATE orders SET is_paid = TRUE, paid_at = $2 WHERE id = $1 AND is_paid = FALSE",
        )
        .bind(order_id.as_uuid())
        .bind(paid_at)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            let exists: Option<bool> =
                sqlx::query_scalar("SELECT is_paid FROM orders WHERE id = $1")
                    .bind(order_id.as_uuid())
                    .fetch_optional(&mut *self.tx)
                    .await?;

            return match exists {
                Some(_) => Err(StoreError::AlreadySettled { order_id }),
                None => Err(StoreError::NotFound { entity: "order" }),
            };
        }
        Ok(())
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
