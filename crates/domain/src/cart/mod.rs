//! Cart aggregate: mutable pre-purchase line items with derived prices.

mod aggregate;
pub mod pricing;

pub use aggregate::{Cart, CartError, RemovedItem};
pub use pricing::{CartTotals, derive_prices};

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

/// A line item in a cart.
///
/// Carries a display snapshot of the product (name, slug, image, price) so
/// the cart renders without a catalog join. At most one line item per
/// product exists within a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// The catalog product this line refers to.
    pub product_id: ProductId,
    /// Product name at the time of adding.
    pub name: String,
    /// Product slug at the time of adding.
    pub slug: String,
    /// Product image path at the time of adding.
    pub image: String,
    /// Unit price at the time of adding.
    pub price: Money,
    /// Units of the product in the cart, always at least 1.
    pub qty: u32,
}

impl CartItem {
    /// Returns `price × qty` for this line.
    pub fn line_total(&self) -> Money {
        self.price.multiply(self.qty)
    }
}
