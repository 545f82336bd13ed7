//! Cart mutations: add a unit, remove a unit, adopt a session cart.

use chrono::{DateTime, Utc};
use common::{OwnerKey, ProductId, RequestContext, SessionId, UserId};
use domain::{Cart, CartError, CartItem, stock_available};
use store::StorefrontStore;

use crate::error::{CheckoutError, Result};

/// Outcome of a cart or order action, shaped for direct display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Whether the action succeeded.
    pub success: bool,
    /// Human-readable message for the caller.
    pub message: String,
}

impl ActionOutcome {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Cart workflows over a store backend.
///
/// The `try_*` variants return typed errors; the plain variants flatten
/// them into an [`ActionOutcome`] whose message is safe to show as-is.
#[derive(Clone)]
pub struct CartService<S: StorefrontStore> {
    store: S,
}

impl<S: StorefrontStore> CartService<S> {
    /// Creates a new cart service.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the caller's cart, if one exists.
    pub async fn get_cart(&self, ctx: &RequestContext) -> Result<Option<Cart>> {
        let owner = ctx.owner_key().ok_or(CheckoutError::NoSession)?;
        Ok(self.store.find_cart(owner).await?)
    }

    /// Adds one unit of a product to the caller's cart.
    pub async fn add_item(
        &self,
        ctx: &RequestContext,
        product_id: ProductId,
        now: DateTime<Utc>,
    ) -> ActionOutcome {
        match self.try_add_item(ctx, product_id, now).await {
            Ok(outcome) => outcome,
            Err(err) => ActionOutcome::err(err.to_string()),
        }
    }

    /// Adds one unit of a product, returning typed errors.
    ///
    /// Guards the new quantity against current stock before mutating. The
    /// guard is advisory: between this read and the upsert another request
    /// can take the same unit, and settlement is where overselling is
    /// actually refused.
    #[tracing::instrument(skip(self, ctx, now), fields(%product_id))]
    pub async fn try_add_item(
        &self,
        ctx: &RequestContext,
        product_id: ProductId,
        now: DateTime<Utc>,
    ) -> Result<ActionOutcome> {
        let owner = ctx.owner_key().ok_or(CheckoutError::NoSession)?;
        let product = self
            .store
            .get_product(product_id)
            .await?
            .ok_or(CheckoutError::ProductNotFound)?;

        let mut cart = match self.store.find_cart(owner).await? {
            Some(cart) => cart,
            None => Cart::new(owner, now),
        };

        let desired = cart.quantity_of(product_id) + 1;
        if !stock_available(&product, desired) {
            return Err(CheckoutError::OutOfStock {
                name: product.name.clone(),
            });
        }

        let existed = cart.quantity_of(product_id) > 0;
        cart.add_unit(CartItem {
            product_id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            image: product.image.clone(),
            price: product.price,
            qty: 1,
        });
        self.store.upsert_cart(&cart).await?;

        metrics::counter!("cart_items_added_total").increment(1);
        tracing::info!(cart_id = %cart.id(), qty = desired, "cart item added");

        Ok(ActionOutcome::ok(format!(
            "{} {} cart",
            product.name,
            if existed { "updated in" } else { "added to" }
        )))
    }

    /// Removes one unit of a product from the caller's cart.
    pub async fn remove_item(&self, ctx: &RequestContext, product_id: ProductId) -> ActionOutcome {
        match self.try_remove_item(ctx, product_id).await {
            Ok(outcome) => outcome,
            Err(err) => ActionOutcome::err(err.to_string()),
        }
    }

    /// Removes one unit of a product, returning typed errors.
    ///
    /// The last unit deletes the whole line item.
    #[tracing::instrument(skip(self, ctx), fields(%product_id))]
    pub async fn try_remove_item(
        &self,
        ctx: &RequestContext,
        product_id: ProductId,
    ) -> Result<ActionOutcome> {
        let owner = ctx.owner_key().ok_or(CheckoutError::NoSession)?;
        let product = self
            .store
            .get_product(product_id)
            .await?
            .ok_or(CheckoutError::ProductNotFound)?;
        let mut cart = self
            .store
            .find_cart(owner)
            .await?
            .ok_or(CheckoutError::CartNotFound)?;

        cart.remove_unit(product_id)
            .map_err(|CartError::ItemNotFound { .. }| CheckoutError::ItemNotFound {
                name: product.name.clone(),
            })?;
        self.store.upsert_cart(&cart).await?;

        metrics::counter!("cart_items_removed_total").increment(1);
        tracing::info!(cart_id = %cart.id(), "cart item removed");

        Ok(ActionOutcome::ok(format!(
            "{} was removed from cart",
            product.name
        )))
    }

    /// Rebinds an anonymous session cart to a user after sign-in.
    ///
    /// The session cart wins: if the user already has a cart of their own,
    /// it is deleted before the session cart takes the user key.
    #[tracing::instrument(skip(self))]
    pub async fn adopt_session_cart(&self, session_id: SessionId, user_id: UserId) -> Result<()> {
        let Some(mut cart) = self.store.find_cart(OwnerKey::Session(session_id)).await? else {
            return Ok(());
        };

        if let Some(existing) = self.store.find_cart(OwnerKey::User(user_id)).await? {
            self.store.delete_cart(existing.id()).await?;
        }

        cart.rebind_owner(OwnerKey::User(user_id));
        self.store.upsert_cart(&cart).await?;
        tracing::info!(cart_id = %cart.id(), %user_id, "session cart adopted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::Money;
    use domain::Product;
    use store::{InMemoryStore, ProductStore};

    fn service() -> CartService<InMemoryStore> {
        CartService::new(InMemoryStore::new())
    }

    async fn seed_product(service: &CartService<InMemoryStore>, stock: u32) -> Product {
        let product = Product {
            id: ProductId::new(),
            name: "Widget".to_string(),
            slug: "widget".to_string(),
            image: "/images/widget.jpg".to_string(),
            price: Money::from_cents(19_99),
            stock,
            created_at: Utc::now(),
        };
        service.store.upsert_product(&product).await.unwrap();
        product
    }

    fn session_ctx() -> RequestContext {
        RequestContext {
            user_id: None,
            session_id: Some(SessionId::new()),
        }
    }

    #[tokio::test]
    async fn add_creates_cart_and_reports_added() {
        let service = service();
        let product = seed_product(&service, 5).await;
        let ctx = session_ctx();

        let outcome = service.add_item(&ctx, product.id, Utc::now()).await;
        assert!(outcome.success);
        assert_eq!(outcome.message, "Widget added to cart");

        let cart = service.get_cart(&ctx).await.unwrap().unwrap();
        assert_eq!(cart.quantity_of(product.id), 1);
    }

    #[tokio::test]
    async fn second_add_reports_updated() {
        let service = service();
        let product = seed_product(&service, 5).await;
        let ctx = session_ctx();

        service.add_item(&ctx, product.id, Utc::now()).await;
        let outcome = service.add_item(&ctx, product.id, Utc::now()).await;

        assert!(outcome.success);
        assert_eq!(outcome.message, "Widget updated in cart");
        let cart = service.get_cart(&ctx).await.unwrap().unwrap();
        assert_eq!(cart.quantity_of(product.id), 2);
    }

    #[tokio::test]
    async fn add_refused_when_stock_exhausted() {
        let service = service();
        let product = seed_product(&service, 1).await;
        let ctx = session_ctx();

        service.add_item(&ctx, product.id, Utc::now()).await;
        let result = service.try_add_item(&ctx, product.id, Utc::now()).await;

        assert!(matches!(result, Err(CheckoutError::OutOfStock { .. })));
        let cart = service.get_cart(&ctx).await.unwrap().unwrap();
        assert_eq!(cart.quantity_of(product.id), 1);
    }

    #[tokio::test]
    async fn add_unknown_product_fails() {
        let service = service();
        let ctx = session_ctx();

        let result = service
            .try_add_item(&ctx, ProductId::new(), Utc::now())
            .await;
        assert!(matches!(result, Err(CheckoutError::ProductNotFound)));
    }

    #[tokio::test]
    async fn add_without_identity_fails() {
        let service = service();
        let product = seed_product(&service, 5).await;
        let ctx = RequestContext {
            user_id: None,
            session_id: None,
        };

        let result = service.try_add_item(&ctx, product.id, Utc::now()).await;
        assert!(matches!(result, Err(CheckoutError::NoSession)));
    }

    #[tokio::test]
    async fn remove_decrements_then_deletes_line() {
        let service = service();
        let product = seed_product(&service, 5).await;
        let ctx = session_ctx();

        service.add_item(&ctx, product.id, Utc::now()).await;
        service.add_item(&ctx, product.id, Utc::now()).await;

        let outcome = service.remove_item(&ctx, product.id).await;
        assert!(outcome.success);
        assert_eq!(outcome.message, "Widget was removed from cart");
        let cart = service.get_cart(&ctx).await.unwrap().unwrap();
        assert_eq!(cart.quantity_of(product.id), 1);

        service.remove_item(&ctx, product.id).await;
        let cart = service.get_cart(&ctx).await.unwrap().unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn remove_missing_line_fails_with_name() {
        let service = service();
        let product = seed_product(&service, 5).await;
        let ctx = session_ctx();

        // Cart exists but has a different product in it.
        let other = seed_product_with_slug(&service, "gadget").await;
        service.add_item(&ctx, other.id, Utc::now()).await;

        let result = service.try_remove_item(&ctx, product.id).await;
        assert!(
            matches!(result, Err(CheckoutError::ItemNotFound { ref name }) if name == "Widget")
        );
    }

    async fn seed_product_with_slug(
        service: &CartService<InMemoryStore>,
        slug: &str,
    ) -> Product {
        let product = Product {
            id: ProductId::new(),
            name: "Gadget".to_string(),
            slug: slug.to_string(),
            image: format!("/images/{slug}.jpg"),
            price: Money::from_cents(9_99),
            stock: 5,
            created_at: Utc::now(),
        };
        service.store.upsert_product(&product).await.unwrap();
        product
    }

    #[tokio::test]
    async fn remove_without_cart_fails() {
        let service = service();
        let product = seed_product(&service, 5).await;
        let ctx = session_ctx();

        let result = service.try_remove_item(&ctx, product.id).await;
        assert!(matches!(result, Err(CheckoutError::CartNotFound)));
    }

    #[tokio::test]
    async fn session_cart_adopted_on_sign_in() {
        let service = service();
        let product = seed_product(&service, 5).await;
        let session_id = SessionId::new();
        let ctx = RequestContext {
            user_id: None,
            session_id: Some(session_id),
        };
        service.add_item(&ctx, product.id, Utc::now()).await;

        let user_id = UserId::new();
        service.adopt_session_cart(session_id, user_id).await.unwrap();

        let user_ctx = RequestContext {
            user_id: Some(user_id),
            session_id: None,
        };
        let cart = service.get_cart(&user_ctx).await.unwrap().unwrap();
        assert_eq!(cart.quantity_of(product.id), 1);
        assert!(service.get_cart(&ctx).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn session_cart_replaces_existing_user_cart() {
        let service = service();
        let product = seed_product(&service, 5).await;
        let other = seed_product_with_slug(&service, "gadget").await;

        let user_id = UserId::new();
        let user_ctx = RequestContext {
            user_id: Some(user_id),
            session_id: None,
        };
        service.add_item(&user_ctx, other.id, Utc::now()).await;

        let session_id = SessionId::new();
        let session_ctx = RequestContext {
            user_id: None,
            session_id: Some(session_id),
        };
        service.add_item(&session_ctx, product.id, Utc::now()).await;

        service.adopt_session_cart(session_id, user_id).await.unwrap();

        let cart = service.get_cart(&user_ctx).await.unwrap().unwrap();
        assert_eq!(cart.quantity_of(product.id), 1);
        assert_eq!(cart.quantity_of(other.id), 0);
    }

    #[tokio::test]
    async fn adopting_without_session_cart_is_a_no_op() {
        let service = service();
        service
            .adopt_session_cart(SessionId::new(), UserId::new())
            .await
            .unwrap();
    }
}
