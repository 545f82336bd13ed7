//! Boundary validation for externally supplied shapes.
//!
//! Inputs are validated once, at the edge, into domain types. A failed
//! validation is a hard failure carrying every reason at once, never a
//! silent coercion.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::cart::CartItem;
use crate::order::Order;

/// Outcome of validating an input shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation<T> {
    /// The input is well-formed; the typed value is ready for use.
    Valid(T),
    /// The input was rejected, with one reason per violated rule.
    Invalid(Vec<String>),
}

impl<T> Validation<T> {
    /// Converts into a `Result`, for callers that treat invalid input as
    /// an error.
    pub fn into_result(self) -> Result<T, Vec<String>> {
        match self {
            Validation::Valid(value) => Ok(value),
            Validation::Invalid(reasons) => Err(reasons),
        }
    }
}

/// The add-to-cart input shape as received from the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemInput {
    /// Product to add.
    pub product_id: ProductId,
    /// Product name snapshot.
    pub name: String,
    /// Product slug snapshot.
    pub slug: String,
    /// Product image snapshot.
    pub image: String,
    /// Unit price as a fixed 2-decimal string.
    pub price: Money,
    /// Requested quantity.
    pub qty: u32,
}

/// Validates an add-to-cart input into a [`CartItem`].
pub fn validate_cart_item(input: CartItemInput) -> Validation<CartItem> {
    let mut reasons = Vec::new();

    if input.name.trim().is_empty() {
        reasons.push("name must not be empty".to_string());
    }
    if input.slug.trim().is_empty() {
        reasons.push("slug must not be empty".to_string());
    }
    if input.qty == 0 {
        reasons.push("qty must be at least 1".to_string());
    }
    if input.price.is_negative() {
        reasons.push("price must not be negative".to_string());
    }

    if !reasons.is_empty() {
        return Validation::Invalid(reasons);
    }

    Validation::Valid(CartItem {
        product_id: input.product_id,
        name: input.name,
        slug: input.slug,
        image: input.image,
        price: input.price,
        qty: input.qty,
    })
}

/// Validates an assembled order draft before it is persisted.
///
/// Assembly copies prices verbatim from the cart, so an imbalance here
/// means corrupted cart state, not bad user input.
pub fn validate_order(order: &Order) -> Validation<()> {
    let mut reasons = Vec::new();

    if order.items.is_empty() {
        reasons.push("order must have at least one item".to_string());
    }
    if order.items.iter().any(|item| item.qty == 0) {
        reasons.push("every order item must have qty at least 1".to_string());
    }
    if order.total_price != order.items_price + order.shipping_price + order.tax_price {
        reasons.push("order prices do not balance".to_string());
    }
    if order.payment_method.trim().is_empty() {
        reasons.push("payment method must not be empty".to_string());
    }

    if reasons.is_empty() {
        Validation::Valid(())
    } else {
        Validation::Invalid(reasons)
    }
}
