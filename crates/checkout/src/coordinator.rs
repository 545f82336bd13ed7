//! Checkout coordinator: order placement, settlement, fulfillment.

use chrono::{DateTime, Utc};
use common::{OrderId, OwnerKey, RequestContext};
use domain::{Order, Validation, assemble_order, validate_order};
use store::{CheckoutTx, StorefrontStore};

use crate::cart_service::ActionOutcome;
use crate::error::{CheckoutError, Result};
use crate::notify::NotificationService;

/// Outcome of an order placement attempt, shaped for direct display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOrderOutcome {
    /// Whether the order was created.
    pub success: bool,
    /// Human-readable message for the caller.
    pub message: String,
    /// Where the caller should go next: the new order's page on success,
    /// the page fixing the unmet precondition on failure, nothing for
    /// hard failures.
    pub redirect_to: Option<String>,
}

/// Orchestrates the multi-step checkout workflows.
///
/// Placement and settlement each run their writes under one store
/// transaction: either every step lands or none do. Receipt notification
/// runs strictly after the settlement commit and its failure is logged,
/// never surfaced.
pub struct CheckoutCoordinator<S, N>
where
    S: StorefrontStore,
    N: NotificationService,
{
    store: S,
    notifier: N,
}

impl<S, N> CheckoutCoordinator<S, N>
where
    S: StorefrontStore,
    N: NotificationService,
{
    /// Creates a new checkout coordinator.
    pub fn new(store: S, notifier: N) -> Self {
        Self { store, notifier }
    }

    /// Places an order from the signed-in caller's cart.
    pub async fn create_order(&self, ctx: &RequestContext, now: DateTime<Utc>) -> PlaceOrderOutcome {
        match self.try_create_order(ctx, now).await {
            Ok(order_id) => PlaceOrderOutcome {
                success: true,
                message: "Order created".to_string(),
                redirect_to: Some(format!("/order/{order_id}")),
            },
            Err(err) => PlaceOrderOutcome {
                success: false,
                message: err.to_string(),
                redirect_to: err.redirect_to().map(String::from),
            },
        }
    }

    /// Places an order, returning typed errors.
    ///
    /// Order insert, item inserts, and the cart reset commit together.
    /// Stock is not touched here; it is taken at settlement.
    #[tracing::instrument(skip(self, ctx, now))]
    pub async fn try_create_order(
        &self,
        ctx: &RequestContext,
        now: DateTime<Utc>,
    ) -> Result<OrderId> {
        metrics::counter!("orders_create_attempts_total").increment(1);
        let started = std::time::Instant::now();

        let user_id = ctx.user_id.ok_or(CheckoutError::Unauthenticated)?;
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(CheckoutError::UserNotFound)?;
        let cart = self
            .store
            .find_cart(OwnerKey::User(user_id))
            .await?
            .ok_or(CheckoutError::EmptyCart)?;

        let order = assemble_order(&cart, &user, now)?;
        if let Validation::Invalid(reasons) = validate_order(&order) {
            return Err(CheckoutError::Validation(reasons));
        }

        let mut tx = self.store.begin().await?;
        let staged = async {
            tx.insert_order(&order).await?;
            tx.insert_order_items(order.id, &order.items).await?;
            tx.reset_cart(cart.id()).await?;
            Ok::<_, CheckoutError>(())
        }
        .await;
        match staged {
            Ok(()) => tx.commit().await?,
            Err(err) => {
                tx.rollback().await?;
                return Err(err);
            }
        }

        metrics::counter!("orders_created_total").increment(1);
        metrics::histogram!("order_placement_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        tracing::info!(order_id = %order.id, %user_id, total = %order.total_price, "order created");

        Ok(order.id)
    }

    /// Settles an order as paid.
    pub async fn update_order_to_paid(&self, order_id: OrderId, now: DateTime<Utc>) -> ActionOutcome {
        match self.try_update_order_to_paid(order_id, now).await {
            Ok(()) => ActionOutcome {
                success: true,
                message: "Order marked as paid".to_string(),
            },
            Err(err) => ActionOutcome {
                success: false,
                message: err.to_string(),
            },
        }
    }

    /// Settles an order as paid, returning typed errors.
    ///
    /// Stock is taken here: one conditional decrement per line item, all
    /// under the same transaction as the paid flag. A single exhausted
    /// product aborts the settlement and nothing changes.
    #[tracing::instrument(skip(self, now), fields(%order_id))]
    pub async fn try_update_order_to_paid(
        &self,
        order_id: OrderId,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or(CheckoutError::OrderNotFound)?;
        order.mark_paid(now)?;

        let mut tx = self.store.begin().await?;
        let staged = async {
            for item in &order.items {
                tx.decrement_stock(item.product_id, item.qty).await?;
            }
            tx.set_paid(order_id, now).await?;
            Ok::<_, CheckoutError>(())
        }
        .await;
        match staged {
            Ok(()) => tx.commit().await?,
            Err(err) => {
                tx.rollback().await?;
                metrics::counter!("orders_settlement_failed_total").increment(1);
                return Err(err);
            }
        }

        metrics::counter!("orders_paid_total").increment(1);
        tracing::info!(total = %order.total_price, "order settled");

        // Post-commit: the payment stands whether or not the receipt
        // goes out.
        match self.store.get_user(order.user_id).await {
            Ok(Some(user)) => {
                if let Err(err) = self.notifier.send_receipt(&order, &user).await {
                    tracing::warn!(%order_id, error = %err, "receipt notification failed");
                }
            }
            Ok(None) => {
                tracing::warn!(%order_id, user_id = %order.user_id, "receipt skipped, user missing");
            }
            Err(err) => {
                tracing::warn!(%order_id, error = %err, "receipt skipped, user lookup failed");
            }
        }

        Ok(())
    }

    /// Marks a paid order as delivered.
    pub async fn deliver_order(&self, order_id: OrderId, now: DateTime<Utc>) -> ActionOutcome {
        match self.try_deliver_order(order_id, now).await {
            Ok(()) => ActionOutcome {
                success: true,
                message: "Order has been marked delivered".to_string(),
            },
            Err(err) => ActionOutcome {
                success: false,
                message: err.to_string(),
            },
        }
    }

    /// Marks a paid order as delivered, returning typed errors.
    #[tracing::instrument(skip(self, now), fields(%order_id))]
    pub async fn try_deliver_order(&self, order_id: OrderId, now: DateTime<Utc>) -> Result<()> {
        let mut order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or(CheckoutError::OrderNotFound)?;
        order.mark_delivered(now)?;

        self.store.set_delivered(order_id, now).await?;

        metrics::counter!("orders_delivered_total").increment(1);
        tracing::info!("order delivered");
        Ok(())
    }

    /// Deletes an order (admin path).
    pub async fn delete_order(&self, order_id: OrderId) -> ActionOutcome {
        match self.try_delete_order(order_id).await {
            Ok(()) => ActionOutcome {
                success: true,
                message: "Order deleted successfully".to_string(),
            },
            Err(err) => ActionOutcome {
                success: false,
                message: err.to_string(),
            },
        }
    }

    /// Deletes an order, returning typed errors. Stock taken by a settled
    /// order is not returned.
    #[tracing::instrument(skip(self), fields(%order_id))]
    pub async fn try_delete_order(&self, order_id: OrderId) -> Result<()> {
        self.store.delete_order(order_id).await.map_err(|err| match err {
            store::StoreError::NotFound { .. } => CheckoutError::OrderNotFound,
            other => CheckoutError::Store(other),
        })?;
        tracing::info!("order deleted");
        Ok(())
    }

    /// Loads an order (caller does authorization).
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order> {
        self.store
            .get_order(order_id)
            .await?
            .ok_or(CheckoutError::OrderNotFound)
    }
}
