//! Catalog product record and the stock guard.

use chrono::{DateTime, Utc};
use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

/// A catalog product.
///
/// The catalog is an external collaborator: this core reads price and
/// stock, and mutates stock only through the settlement transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product id.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// URL slug, unique within the catalog.
    pub slug: String,
    /// Primary image path.
    pub image: String,
    /// Current list price.
    pub price: Money,
    /// Authoritative units on hand.
    pub stock: u32,
    /// Catalog insertion time.
    pub created_at: DateTime<Utc>,
}

/// Pure stock predicate: can `requested` units be taken from this product?
///
/// Advisory only. It runs before every quantity-increasing cart mutation,
/// but nothing holds the stock between the check and a later settlement;
/// two sessions can each pass the check for the last unit. The
/// authoritative guard is the conditional decrement inside the settlement
/// transaction.
pub fn stock_available(product: &Product, requested: u32) -> bool {
    requested <= product.stock
}
