//! The cart aggregate.

use chrono::{DateTime, Utc};
use common::{CartId, OwnerKey, ProductId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::pricing::{CartTotals, derive_prices};
use super::CartItem;

/// Errors from cart aggregate operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The product has no line item in this cart.
    #[error("item not found in cart: {product_id}")]
    ItemNotFound {
        /// The product that was looked up.
        product_id: ProductId,
    },
}

/// What happened to a line item when one unit was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovedItem {
    /// The last unit was removed and the line item deleted.
    LineRemoved,
    /// The quantity was decremented and the line item remains.
    QtyDecremented,
}

/// A mutable pre-purchase cart tied to a user or an anonymous session.
///
/// The four price fields are derived: every mutation recomputes them from
/// the full item set via [`derive_prices`]. They are never written
/// independently, so `total = items + shipping + tax` holds at all times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    id: CartId,
    owner: OwnerKey,
    items: Vec<CartItem>,
    #[serde(flatten)]
    totals: CartTotals,
    created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates an empty cart for the given owner.
    pub fn new(owner: OwnerKey, now: DateTime<Utc>) -> Self {
        Self {
            id: CartId::new(),
            owner,
            items: Vec::new(),
            totals: CartTotals::zero(),
            created_at: now,
        }
    }

    /// Rebuilds a cart from stored parts, recomputing the derived prices
    /// from the item set.
    pub fn from_parts(
        id: CartId,
        owner: OwnerKey,
        items: Vec<CartItem>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let totals = derive_prices(&items);
        Self {
            id,
            owner,
            items,
            totals,
            created_at,
        }
    }

    /// Returns the cart id.
    pub fn id(&self) -> CartId {
        self.id
    }

    /// Returns the owner key.
    pub fn owner(&self) -> OwnerKey {
        self.owner
    }

    /// Returns the line items in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Returns the derived price fields.
    pub fn totals(&self) -> CartTotals {
        self.totals
    }

    /// Returns the creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns true if the cart has no line items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the quantity currently in the cart for a product, zero if
    /// the product has no line item.
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.items
            .iter()
            .find(|item| item.product_id == product_id)
            .map_or(0, |item| item.qty)
    }

    /// Rebinds the cart to a user key after sign-in.
    pub fn rebind_owner(&mut self, owner: OwnerKey) {
        self.owner = owner;
    }

    /// Adds one unit of a product.
    ///
    /// If a line item for the product exists its quantity is incremented
    /// and the snapshot fields are left untouched; otherwise the given
    /// snapshot is appended with quantity 1. Stock is the caller's concern:
    /// the guard runs before this mutation.
    pub fn add_unit(&mut self, snapshot: CartItem) {
        match self
            .items
            .iter_mut()
            .find(|item| item.product_id == snapshot.product_id)
        {
            Some(existing) => existing.qty += 1,
            None => self.items.push(CartItem { qty: 1, ..snapshot }),
        }
        self.recompute();
    }

    /// Removes one unit of a product.
    ///
    /// The last unit deletes the line item entirely.
    pub fn remove_unit(&mut self, product_id: ProductId) -> Result<RemovedItem, CartError> {
        let index = self
            .items
            .iter()
            .position(|item| item.product_id == product_id)
            .ok_or(CartError::ItemNotFound { product_id })?;

        let removed = if self.items[index].qty == 1 {
            self.items.remove(index);
            RemovedItem::LineRemoved
        } else {
            self.items[index].qty -= 1;
            RemovedItem::QtyDecremented
        };

        self.recompute();
        Ok(removed)
    }

    /// Empties the cart and zeroes all four prices, the post-checkout
    /// state. The cart record itself survives.
    pub fn reset(&mut self) {
        self.items.clear();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.totals = derive_prices(&self.items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Money, SessionId, UserId};

    fn snapshot(product_id: ProductId, price_cents: i64) -> CartItem {
        CartItem {
            product_id,
            name: "Widget".to_string(),
            slug: "widget".to_string(),
            image: "/images/widget.jpg".to_string(),
            price: Money::from_cents(price_cents),
            qty: 1,
        }
    }

    fn new_cart() -> Cart {
        Cart::new(OwnerKey::Session(SessionId::new()), Utc::now())
    }

    #[test]
    fn new_cart_is_empty_with_zero_prices() {
        let cart = new_cart();
        assert!(cart.is_empty());
        assert_eq!(cart.totals(), CartTotals::zero());
    }

    #[test]
    fn adding_same_product_twice_increments_qty() {
        let mut cart = new_cart();
        let product_id = ProductId::new();

        cart.add_unit(snapshot(product_id, 19_99));
        cart.add_unit(snapshot(product_id, 19_99));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.quantity_of(product_id), 2);
        assert_eq!(cart.totals().items_price, Money::from_cents(39_98));
    }

    #[test]
    fn adding_distinct_products_appends_lines() {
        let mut cart = new_cart();
        cart.add_unit(snapshot(ProductId::new(), 10_00));
        cart.add_unit(snapshot(ProductId::new(), 5_00));

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.totals().items_price, Money::from_cents(15_00));
    }

    #[test]
    fn add_forces_qty_one_on_new_lines() {
        let mut cart = new_cart();
        let product_id = ProductId::new();
        let mut item = snapshot(product_id, 10_00);
        item.qty = 7;

        cart.add_unit(item);
        assert_eq!(cart.quantity_of(product_id), 1);
    }

    #[test]
    fn removing_non_last_unit_decrements() {
        let mut cart = new_cart();
        let product_id = ProductId::new();
        cart.add_unit(snapshot(product_id, 10_00));
        cart.add_unit(snapshot(product_id, 10_00));

        let removed = cart.remove_unit(product_id).unwrap();
        assert_eq!(removed, RemovedItem::QtyDecremented);
        assert_eq!(cart.quantity_of(product_id), 1);
    }

    #[test]
    fn removing_last_unit_deletes_line() {
        let mut cart = new_cart();
        let product_id = ProductId::new();
        cart.add_unit(snapshot(product_id, 10_00));

        let removed = cart.remove_unit(product_id).unwrap();
        assert_eq!(removed, RemovedItem::LineRemoved);
        assert!(cart.is_empty());
        assert_eq!(cart.totals(), CartTotals::zero());
    }

    #[test]
    fn removing_absent_product_fails() {
        let mut cart = new_cart();
        let result = cart.remove_unit(ProductId::new());
        assert!(matches!(result, Err(CartError::ItemNotFound { .. })));
    }

    #[test]
    fn prices_recomputed_on_every_mutation() {
        let mut cart = new_cart();
        let a = ProductId::new();
        let b = ProductId::new();

        cart.add_unit(snapshot(a, 60_00));
        assert_eq!(cart.totals().shipping_price, Money::from_cents(10_00));

        // Crossing the free-shipping threshold drops the charge.
        cart.add_unit(snapshot(b, 60_00));
        assert_eq!(cart.totals().shipping_price, Money::zero());

        cart.remove_unit(b).unwrap();
        assert_eq!(cart.totals().shipping_price, Money::from_cents(10_00));
        assert!(cart.totals().balances());
    }

    #[test]
    fn reset_empties_and_zeroes() {
        let mut cart = new_cart();
        cart.add_unit(snapshot(ProductId::new(), 42_00));
        cart.reset();

        assert!(cart.is_empty());
        assert_eq!(cart.totals(), CartTotals::zero());
    }

    #[test]
    fn rebind_owner_switches_key() {
        let mut cart = new_cart();
        let user_id = UserId::new();
        cart.rebind_owner(OwnerKey::User(user_id));
        assert_eq!(cart.owner(), OwnerKey::User(user_id));
    }

    #[test]
    fn from_parts_recomputes_totals() {
        let product_id = ProductId::new();
        let items = vec![CartItem {
            qty: 2,
            ..snapshot(product_id, 50_00)
        }];
        let cart = Cart::from_parts(
            CartId::new(),
            OwnerKey::User(UserId::new()),
            items,
            Utc::now(),
        );

        assert_eq!(cart.totals().items_price, Money::from_cents(100_00));
        assert_eq!(cart.totals().total_price, Money::from_cents(125_00));
    }

    #[test]
    fn serialization_roundtrip() {
        let mut cart = new_cart();
        cart.add_unit(snapshot(ProductId::new(), 19_99));

        let json = serde_json::to_string(&cart).unwrap();
        let back: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cart);
    }
}
