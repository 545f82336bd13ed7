//! Order aggregate: the immutable post-checkout record.

mod aggregate;
mod draft;
mod state;

pub use aggregate::{FulfillmentError, Order};
pub use draft::{AssemblyError, assemble_order};
pub use state::FulfillmentState;

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

/// A line item owned by an order.
///
/// Created together with its order and never independently. The price is
/// a point-in-time snapshot taken from the cart, unaffected by later
/// catalog price changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// The catalog product this line refers to.
    pub product_id: ProductId,
    /// Product name at order time.
    pub name: String,
    /// Product slug at order time.
    pub slug: String,
    /// Product image path at order time.
    pub image: String,
    /// Unit price snapshot at order time.
    pub price: Money,
    /// Units ordered.
    pub qty: u32,
}

impl OrderItem {
    /// Returns `price × qty` for this line.
    pub fn line_total(&self) -> Money {
        self.price.multiply(self.qty)
    }
}
