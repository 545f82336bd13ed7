//! Derivation of the four cart price fields.

use common::Money;
use serde::{Deserialize, Serialize};

use super::CartItem;

/// Orders above this items subtotal ship for free.
pub const FREE_SHIPPING_THRESHOLD: Money = Money::from_cents(100_00);

/// Flat shipping charge below the free-shipping threshold.
pub const FLAT_SHIPPING: Money = Money::from_cents(10_00);

/// Sales tax rate applied to the items subtotal, in percent.
pub const TAX_RATE_PCT: u32 = 15;

/// The four derived price fields of a cart or order.
///
/// These are always produced together by [`derive_prices`] and never
/// authored independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartTotals {
    /// Sum of `price × qty` over all line items.
    pub items_price: Money,
    /// Flat charge below the threshold, zero above it.
    pub shipping_price: Money,
    /// 15% of the items subtotal, rounded half away from zero.
    pub tax_price: Money,
    /// `items_price + shipping_price + tax_price`.
    pub total_price: Money,
}

impl CartTotals {
    /// All four prices zero, the state of a freshly reset cart.
    pub fn zero() -> Self {
        Self::default()
    }

    /// True when the four fields satisfy the balance invariant.
    pub fn balances(&self) -> bool {
        self.total_price == self.items_price + self.shipping_price + self.tax_price
    }
}

/// Recomputes all four derived prices from a full item set.
///
/// An empty item set prices to zero across the board: a cart that has just
/// been reset (or emptied item by item) carries no shipping charge.
pub fn derive_prices(items: &[CartItem]) -> CartTotals {
    if items.is_empty() {
        return CartTotals::zero();
    }

    let items_price = items
        .iter()
        .fold(Money::zero(), |acc, item| acc + item.line_total());

    let shipping_price = if items_price > FREE_SHIPPING_THRESHOLD {
        Money::zero()
    } else {
        FLAT_SHIPPING
    };

    let tax_price = items_price.percent(TAX_RATE_PCT);
    let total_price = items_price + shipping_price + tax_price;

    CartTotals {
        items_price,
        shipping_price,
        tax_price,
        total_price,
    }
}
