//! Order assembly: snapshotting a finalized cart into an order draft.

use chrono::{DateTime, Utc};
use common::OrderId;
use thiserror::Error;

use crate::cart::Cart;
use crate::user::User;

use super::{Order, OrderItem};

/// Reasons a cart cannot be assembled into an order.
///
/// These are control outcomes, not system errors: each maps to the page
/// that can resolve the missing precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AssemblyError {
    /// The user has no shipping address on file.
    #[error("shipping address is missing")]
    MissingAddress,
    /// The user has no payment method on file.
    #[error("payment method is missing")]
    MissingPaymentMethod,
    /// The cart has no items.
    #[error("cart is empty")]
    EmptyCart,
}

impl AssemblyError {
    /// The page that can resolve this precondition.
    pub fn redirect_to(&self) -> &'static str {
        match self {
            AssemblyError::MissingAddress => "/shipping-address",
            AssemblyError::MissingPaymentMethod => "/payment-method",
            AssemblyError::EmptyCart => "/cart",
        }
    }
}

/// Builds an order draft from a finalized cart and its owning user.
///
/// Prices are copied verbatim from the cart's derived totals, not
/// recomputed; each cart line becomes an order line with its price frozen
/// as a point-in-time snapshot. The draft is not persisted here — the
/// transaction coordinator commits it atomically.
pub fn assemble_order(cart: &Cart, user: &User, now: DateTime<Utc>) -> Result<Order, AssemblyError> {
    let address = user
        .address
        .as_ref()
        .ok_or(AssemblyError::MissingAddress)?;
    let payment_method = user
        .payment_method
        .as_ref()
        .ok_or(AssemblyError::MissingPaymentMethod)?;

    if cart.is_empty() {
        return Err(AssemblyError::EmptyCart);
    }

    let items = cart
        .items()
        .iter()
        .map(|item| OrderItem {
            product_id: item.product_id,
            name: item.name.clone(),
            slug: item.slug.clone(),
            image: item.image.clone(),
            price: item.price,
            qty: item.qty,
        })
        .collect();

    let totals = cart.totals();

    Ok(Order {
        id: OrderId::new(),
        user_id: user.id,
        shipping_address: address.clone(),
        payment_method: payment_method.clone(),
        items,
        items_price: totals.items_price,
        shipping_price: totals.shipping_price,
        tax_price: totals.tax_price,
        total_price: totals.total_price,
        is_paid: false,
        paid_at: None,
        is_delivered: false,
        delivered_at: None,
        created_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartItem;
    use crate::user::ShippingAddress;
    use common::{Money, OwnerKey, ProductId, UserId};

    fn user_on_file() -> User {
        User {
            id: UserId::new(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            address: Some(ShippingAddress {
                full_name: "Ada Lovelace".to_string(),
                street: "1 Analytical Way".to_string(),
                city: "London".to_string(),
                postal_code: "N1 9GU".to_string(),
                country: "GB".to_string(),
            }),
            payment_method: Some("PayPal".to_string()),
        }
    }

    fn cart_with_item(user_id: UserId, price_cents: i64, extra_units: u32) -> Cart {
        let mut cart = Cart::new(OwnerKey::User(user_id), Utc::now());
        let snapshot = CartItem {
            product_id: ProductId::new(),
            name: "Widget".to_string(),
            slug: "widget".to_string(),
            image: "/images/widget.jpg".to_string(),
            price: Money::from_cents(price_cents),
            qty: 1,
        };
        cart.add_unit(snapshot.clone());
        for _ in 0..extra_units {
            cart.add_unit(snapshot.clone());
        }
        cart
    }

    #[test]
    fn missing_address_fails_first() {
        let mut user = user_on_file();
        user.address = None;
        user.payment_method = None;
        let cart = cart_with_item(user.id, 50_00, 0);

        let result = assemble_order(&cart, &user, Utc::now());
        assert_eq!(result.unwrap_err(), AssemblyError::MissingAddress);
    }

    #[test]
    fn missing_payment_method_fails() {
        let mut user = user_on_file();
        user.payment_method = None;
        let cart = cart_with_item(user.id, 50_00, 0);

        let result = assemble_order(&cart, &user, Utc::now());
        assert_eq!(result.unwrap_err(), AssemblyError::MissingPaymentMethod);
    }

    #[test]
    fn empty_cart_fails() {
        let user = user_on_file();
        let cart = Cart::new(OwnerKey::User(user.id), Utc::now());

        let result = assemble_order(&cart, &user, Utc::now());
        assert_eq!(result.unwrap_err(), AssemblyError::EmptyCart);
    }

    #[test]
    fn prices_copied_verbatim_from_cart() {
        let user = user_on_file();
        let cart = cart_with_item(user.id, 50_00, 1); // 2 × 50.00

        let order = assemble_order(&cart, &user, Utc::now()).unwrap();

        let totals = cart.totals();
        assert_eq!(order.items_price, totals.items_price);
        assert_eq!(order.shipping_price, totals.shipping_price);
        assert_eq!(order.tax_price, totals.tax_price);
        assert_eq!(order.total_price, totals.total_price);
        assert_eq!(order.total_price, Money::from_cents(125_00));
    }

    #[test]
    fn one_order_item_per_cart_line() {
        let user = user_on_file();
        let mut cart = cart_with_item(user.id, 10_00, 2);
        cart.add_unit(CartItem {
            product_id: ProductId::new(),
            name: "Gadget".to_string(),
            slug: "gadget".to_string(),
            image: "/images/gadget.jpg".to_string(),
            price: Money::from_cents(5_00),
            qty: 1,
        });

        let order = assemble_order(&cart, &user, Utc::now()).unwrap();

        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].qty, 3);
        assert_eq!(order.items[1].qty, 1);
    }

    #[test]
    fn draft_starts_unpaid_and_undelivered() {
        let user = user_on_file();
        let cart = cart_with_item(user.id, 50_00, 0);

        let order = assemble_order(&cart, &user, Utc::now()).unwrap();

        assert!(!order.is_paid);
        assert!(order.paid_at.is_none());
        assert!(!order.is_delivered);
        assert!(order.delivered_at.is_none());
    }

    #[test]
    fn redirect_targets() {
        assert_eq!(AssemblyError::MissingAddress.redirect_to(), "/shipping-address");
        assert_eq!(
            AssemblyError::MissingPaymentMethod.redirect_to(),
            "/payment-method"
        );
        assert_eq!(AssemblyError::EmptyCart.redirect_to(), "/cart");
    }
}
