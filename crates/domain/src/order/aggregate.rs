//! The order record and its lifecycle transitions.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::user::ShippingAddress;

use super::{FulfillmentState, OrderItem};

/// Errors from order lifecycle transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FulfillmentError {
    /// The order has already been paid.
    #[error("order is already paid")]
    AlreadyPaid,
    /// The order has not been paid yet.
    #[error("order is not paid")]
    NotPaid,
    /// The order has already been delivered.
    #[error("order is already delivered")]
    AlreadyDelivered,
}

/// An immutable post-checkout order.
///
/// Everything except the four lifecycle fields (`is_paid`/`paid_at`,
/// `is_delivered`/`delivered_at`) is frozen at creation. Prices are copied
/// verbatim from the cart that produced the order, not recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order id.
    pub id: OrderId,
    /// The user who placed the order.
    pub user_id: UserId,
    /// Shipping address snapshot at order time.
    pub shipping_address: ShippingAddress,
    /// Payment method snapshot at order time.
    pub payment_method: String,
    /// Line items, in cart order.
    pub items: Vec<OrderItem>,
    /// Items subtotal copied from the cart.
    pub items_price: Money,
    /// Shipping charge copied from the cart.
    pub shipping_price: Money,
    /// Tax copied from the cart.
    pub tax_price: Money,
    /// Grand total copied from the cart.
    pub total_price: Money,
    /// True once payment has settled.
    pub is_paid: bool,
    /// Settlement time, set iff `is_paid`.
    pub paid_at: Option<DateTime<Utc>>,
    /// True once delivered.
    pub is_delivered: bool,
    /// Delivery time, set iff `is_delivered`.
    pub delivered_at: Option<DateTime<Utc>>,
    /// Order creation time.
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Returns the fulfillment state derived from the lifecycle flags.
    pub fn state(&self) -> FulfillmentState {
        FulfillmentState::from_flags(self.is_paid, self.is_delivered)
    }

    /// Marks the order paid at the given time.
    pub fn mark_paid(&mut self, now: DateTime<Utc>) -> Result<(), FulfillmentError> {
        if !self.state().can_pay() {
            return Err(FulfillmentError::AlreadyPaid);
        }
        self.is_paid = true;
        self.paid_at = Some(now);
        Ok(())
    }

    /// Marks the order delivered at the given time.
    pub fn mark_delivered(&mut self, now: DateTime<Utc>) -> Result<(), FulfillmentError> {
        match self.state() {
            FulfillmentState::Created => Err(FulfillmentError::NotPaid),
            FulfillmentState::Delivered => Err(FulfillmentError::AlreadyDelivered),
            FulfillmentState::Paid => {
                self.is_delivered = true;
                self.delivered_at = Some(now);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ProductId;

    pub(crate) fn sample_order() -> Order {
        Order {
            id: OrderId::new(),
            user_id: UserId::new(),
            shipping_address: ShippingAddress {
                full_name: "Ada Lovelace".to_string(),
                street: "1 Analytical Way".to_string(),
                city: "London".to_string(),
                postal_code: "N1 9GU".to_string(),
                country: "GB".to_string(),
            },
            payment_method: "PayPal".to_string(),
            items: vec![OrderItem {
                product_id: ProductId::new(),
                name: "Widget".to_string(),
                slug: "widget".to_string(),
                image: "/images/widget.jpg".to_string(),
                price: Money::from_cents(50_00),
                qty: 2,
            }],
            items_price: Money::from_cents(100_00),
            shipping_price: Money::from_cents(10_00),
            tax_price: Money::from_cents(15_00),
            total_price: Money::from_cents(125_00),
            is_paid: false,
            paid_at: None,
            is_delivered: false,
            delivered_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn fresh_order_is_created() {
        let order = sample_order();
        assert_eq!(order.state(), FulfillmentState::Created);
    }

    #[test]
    fn mark_paid_sets_flag_and_timestamp() {
        let mut order = sample_order();
        let now = Utc::now();

        order.mark_paid(now).unwrap();

        assert!(order.is_paid);
        assert_eq!(order.paid_at, Some(now));
        assert_eq!(order.state(), FulfillmentState::Paid);
    }

    #[test]
    fn mark_paid_twice_fails() {
        let mut order = sample_order();
        order.mark_paid(Utc::now()).unwrap();

        let result = order.mark_paid(Utc::now());
        assert_eq!(result, Err(FulfillmentError::AlreadyPaid));
    }

    #[test]
    fn mark_delivered_requires_payment() {
        let mut order = sample_order();
        let result = order.mark_delivered(Utc::now());
        assert_eq!(result, Err(FulfillmentError::NotPaid));
    }

    #[test]
    fn mark_delivered_after_payment() {
        let mut order = sample_order();
        order.mark_paid(Utc::now()).unwrap();

        let now = Utc::now();
        order.mark_delivered(now).unwrap();

        assert!(order.is_delivered);
        assert_eq!(order.delivered_at, Some(now));
        assert_eq!(order.state(), FulfillmentState::Delivered);
        assert!(order.state().is_terminal());
    }

    #[test]
    fn mark_delivered_twice_fails() {
        let mut order = sample_order();
        order.mark_paid(Utc::now()).unwrap();
        order.mark_delivered(Utc::now()).unwrap();

        let result = order.mark_delivered(Utc::now());
        assert_eq!(result, Err(FulfillmentError::AlreadyDelivered));
    }

    #[test]
    fn delivered_implies_paid() {
        let mut order = sample_order();
        order.mark_paid(Utc::now()).unwrap();
        order.mark_delivered(Utc::now()).unwrap();

        assert!(order.is_paid, "delivered order must be paid");
        assert!(order.paid_at.is_some());
        assert!(order.delivered_at.is_some());
    }

    #[test]
    fn serialization_roundtrip() {
        let order = sample_order();
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(back, order);
    }
}
